//! Persistence Contract
//!
//! Topics and the current-topic selection persist through a small key-value
//! style contract with two entries: the serialized topic list and the id of
//! the currently selected topic. Loads are infallible from the caller's
//! perspective (missing or corrupt data degrades to empty, with a logged
//! parse failure); saves report I/O errors so the store can log them
//! without propagating.

use crate::topic::Topic;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

const TOPICS_FILE: &str = "learnie_topics.json";
const CURRENT_TOPIC_FILE: &str = "learnie_current_topic_id";

/// Load/save contract for topic state.
pub trait TopicStorage: Send {
    /// Loads all persisted topics. Missing or corrupt data yields an empty
    /// list; parse failures are logged, never surfaced.
    fn load_topics(&self) -> Vec<Topic>;

    /// Persists the full topic list.
    fn save_topics(&self, topics: &[Topic]) -> io::Result<()>;

    /// Loads the persisted current-topic id, validated against the given
    /// topic list. `None` when unset or when the id dangles.
    fn load_current_topic_id(&self, topics: &[Topic]) -> Option<String>;

    /// Persists the current-topic selection; `None` clears the entry.
    fn save_current_topic_id(&self, topic_id: Option<&str>) -> io::Result<()>;
}

/// File-backed storage: one JSON file for the topic list, one plain-text
/// file for the current-topic id, both under a configurable directory.
pub struct FileTopicStorage {
    dir: PathBuf,
}

impl FileTopicStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn topics_path(&self) -> PathBuf {
        self.dir.join(TOPICS_FILE)
    }

    fn current_topic_path(&self) -> PathBuf {
        self.dir.join(CURRENT_TOPIC_FILE)
    }
}

impl TopicStorage for FileTopicStorage {
    fn load_topics(&self) -> Vec<Topic> {
        let raw = match fs::read_to_string(self.topics_path()) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(topics) => topics,
            Err(error) => {
                warn!(%error, "Failed to parse persisted topics, starting empty");
                Vec::new()
            }
        }
    }

    fn save_topics(&self, topics: &[Topic]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let serialized = serde_json::to_string(topics)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        fs::write(self.topics_path(), serialized)
    }

    fn load_current_topic_id(&self, topics: &[Topic]) -> Option<String> {
        let id = fs::read_to_string(self.current_topic_path()).ok()?;
        let id = id.trim();
        if topics.iter().any(|topic| topic.id == id) {
            Some(id.to_string())
        } else {
            None
        }
    }

    fn save_current_topic_id(&self, topic_id: Option<&str>) -> io::Result<()> {
        match topic_id {
            Some(id) => {
                fs::create_dir_all(&self.dir)?;
                fs::write(self.current_topic_path(), id)
            }
            None => match fs::remove_file(self.current_topic_path()) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(error),
            },
        }
    }
}

/// In-process storage for tests and embedding scenarios where durability is
/// not wanted.
#[derive(Default)]
pub struct MemoryTopicStorage {
    topics: Mutex<Vec<Topic>>,
    current_topic_id: Mutex<Option<String>>,
}

impl MemoryTopicStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TopicStorage for MemoryTopicStorage {
    fn load_topics(&self) -> Vec<Topic> {
        self.topics.lock().unwrap().clone()
    }

    fn save_topics(&self, topics: &[Topic]) -> io::Result<()> {
        *self.topics.lock().unwrap() = topics.to_vec();
        Ok(())
    }

    fn load_current_topic_id(&self, topics: &[Topic]) -> Option<String> {
        let id = self.current_topic_id.lock().unwrap().clone()?;
        topics.iter().any(|topic| topic.id == id).then_some(id)
    }

    fn save_current_topic_id(&self, topic_id: Option<&str>) -> io::Result<()> {
        *self.current_topic_id.lock().unwrap() = topic_id.map(str::to_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::tests::sample_topic;
    use tempfile::tempdir;

    #[test]
    fn file_storage_round_trips_topics() {
        let dir = tempdir().unwrap();
        let storage = FileTopicStorage::new(dir.path());

        let topics = vec![sample_topic()];
        storage.save_topics(&topics).unwrap();

        let loaded = storage.load_topics();
        assert_eq!(loaded, topics);
    }

    #[test]
    fn file_storage_missing_data_is_empty() {
        let dir = tempdir().unwrap();
        let storage = FileTopicStorage::new(dir.path());
        assert!(storage.load_topics().is_empty());
        assert_eq!(storage.load_current_topic_id(&[]), None);
    }

    #[test]
    fn file_storage_corrupt_data_is_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(TOPICS_FILE), "not json at all").unwrap();

        let storage = FileTopicStorage::new(dir.path());
        assert!(storage.load_topics().is_empty());
    }

    #[test]
    fn current_topic_id_round_trips_and_validates() {
        let dir = tempdir().unwrap();
        let storage = FileTopicStorage::new(dir.path());
        let topics = vec![sample_topic()];

        storage.save_current_topic_id(Some("rust-basics-1")).unwrap();
        assert_eq!(
            storage.load_current_topic_id(&topics),
            Some("rust-basics-1".to_string())
        );

        // Dangling ids self-heal to no selection.
        storage.save_current_topic_id(Some("deleted-topic")).unwrap();
        assert_eq!(storage.load_current_topic_id(&topics), None);

        storage.save_current_topic_id(None).unwrap();
        assert_eq!(storage.load_current_topic_id(&topics), None);
    }

    #[test]
    fn clearing_an_unset_current_topic_is_a_no_op() {
        let dir = tempdir().unwrap();
        let storage = FileTopicStorage::new(dir.path());
        storage.save_current_topic_id(None).unwrap();
    }

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemoryTopicStorage::new();
        let topics = vec![sample_topic()];

        storage.save_topics(&topics).unwrap();
        assert_eq!(storage.load_topics(), topics);

        storage.save_current_topic_id(Some("rust-basics-1")).unwrap();
        assert_eq!(
            storage.load_current_topic_id(&topics),
            Some("rust-basics-1".to_string())
        );
        assert_eq!(storage.load_current_topic_id(&[]), None);
    }
}
