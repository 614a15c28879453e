//! Topic State Store
//!
//! Holds the authoritative topic list and the denormalized current-topic
//! clone, both restored from storage at construction and persisted after
//! every mutation. Writes are write-through and fire-and-forget: the
//! in-memory update always succeeds, storage failures are logged and never
//! propagated. Mutations on missing topic or subtopic ids log an error and
//! become silent no-ops; callers treat a no-op as a possible failure
//! signal. The current-topic clone is re-synced on every mutation that can
//! touch it, so readers holding it observe a consistent snapshot.

use crate::storage::TopicStorage;
use crate::topic::{LearningStyle, LearningStyleUpdate, Subtopic, Topic};
use tracing::{debug, error};

pub struct TopicStore {
    topics: Vec<Topic>,
    current_topic: Option<Topic>,
    storage: Box<dyn TopicStorage>,
}

impl TopicStore {
    /// Restores the store from its storage collaborator. Missing or corrupt
    /// data yields an empty store; a persisted current-topic id dangling
    /// after topic removal heals to no selection.
    pub fn new(storage: Box<dyn TopicStorage>) -> Self {
        let topics = storage.load_topics();
        let current_topic = storage
            .load_current_topic_id(&topics)
            .and_then(|id| topics.iter().find(|topic| topic.id == id).cloned());
        Self {
            topics,
            current_topic,
            storage,
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == topic_id)
    }

    pub fn current_topic(&self) -> Option<&Topic> {
        self.current_topic.as_ref()
    }

    /// Appends a topic to the store.
    pub fn add_topic(&mut self, topic: Topic) {
        self.topics.push(topic);
        self.persist_topics();
    }

    /// Appends a subtopic to the section that contains its parent. The
    /// subtopic gets a non-conflicting id (derived from the parent's when
    /// the proposed one is empty or taken) and, when unset, an order one
    /// past the largest sibling order. Logs an error and leaves the store
    /// unchanged when the topic or parent cannot be found.
    pub fn add_subtopic_to_parent(
        &mut self,
        topic_id: &str,
        parent_subtopic_id: &str,
        mut new_subtopic: Subtopic,
    ) {
        let Some(topic) = self.topics.iter_mut().find(|topic| topic.id == topic_id) else {
            error!(topic_id, "Cannot add subtopic: topic not found");
            return;
        };

        let taken_ids = topic.subtopic_ids();
        let Some(section) = topic.sections.iter_mut().find(|section| {
            section
                .subtopics
                .iter()
                .any(|subtopic| subtopic.id == parent_subtopic_id)
        }) else {
            error!(
                topic_id,
                parent_subtopic_id, "Cannot add subtopic: parent not found in any section"
            );
            return;
        };

        if new_subtopic.id.is_empty() || taken_ids.contains(&new_subtopic.id) {
            let mut counter = 1;
            new_subtopic.id = loop {
                let candidate = format!("{parent_subtopic_id}-child-{counter}");
                if !taken_ids.contains(&candidate) {
                    break candidate;
                }
                counter += 1;
            };
        }

        if new_subtopic.order == 0 {
            let max_order = section
                .subtopics
                .iter()
                .map(|subtopic| subtopic.order)
                .max()
                .unwrap_or(0);
            new_subtopic.order = max_order + 1;
        }

        section.subtopics.push(new_subtopic);
        self.persist_topics();
        self.sync_current();
    }

    /// Replaces the subtopic with the matching id. Logs an error and leaves
    /// the topic unchanged when no match exists.
    pub fn update_subtopic(&mut self, topic_id: &str, updated_subtopic: Subtopic) {
        let Some(topic) = self.topics.iter_mut().find(|topic| topic.id == topic_id) else {
            error!(topic_id, "Cannot update subtopic: topic not found");
            return;
        };
        match topic.subtopic_mut(&updated_subtopic.id) {
            Ok(subtopic) => {
                *subtopic = updated_subtopic;
                self.persist_topics();
                self.sync_current();
            }
            Err(lookup) => {
                error!(topic_id, %lookup, "Cannot update subtopic");
            }
        }
    }

    /// Removes the subtopic from whichever section directly contains it.
    /// Logs an error when nothing was removed.
    pub fn remove_subtopic(&mut self, topic_id: &str, subtopic_id: &str) {
        let Some(topic) = self.topics.iter_mut().find(|topic| topic.id == topic_id) else {
            error!(topic_id, "Cannot remove subtopic: topic not found");
            return;
        };
        let mut removed = false;
        for section in &mut topic.sections {
            let before = section.subtopics.len();
            section.subtopics.retain(|subtopic| subtopic.id != subtopic_id);
            removed |= section.subtopics.len() != before;
        }
        if removed {
            self.persist_topics();
            self.sync_current();
        } else {
            error!(topic_id, subtopic_id, "Cannot remove subtopic: not found");
        }
    }

    /// Removes a topic, clearing the current selection if it pointed there.
    pub fn remove_topic(&mut self, topic_id: &str) {
        self.topics.retain(|topic| topic.id != topic_id);
        self.persist_topics();
        if self
            .current_topic
            .as_ref()
            .is_some_and(|current| current.id == topic_id)
        {
            self.current_topic = None;
            self.persist_current_topic_id();
        }
    }

    /// Selects a topic by id, or clears the selection with `None`.
    /// Re-selecting the current topic is a no-op (avoids redundant
    /// downstream refresh); unknown ids are ignored.
    pub fn set_current_topic(&mut self, topic_id: Option<&str>) {
        match topic_id {
            Some(id) => {
                if self
                    .current_topic
                    .as_ref()
                    .is_some_and(|current| current.id == id)
                {
                    debug!(topic_id = id, "Topic already selected");
                    return;
                }
                let Some(topic) = self.topics.iter().find(|topic| topic.id == id) else {
                    error!(topic_id = id, "Cannot select topic: not found");
                    return;
                };
                self.current_topic = Some(topic.clone());
                self.persist_current_topic_id();
            }
            None => {
                if self.current_topic.take().is_some() {
                    self.persist_current_topic_id();
                }
            }
        }
    }

    /// Merges a partial style update into the current topic's learning
    /// style, defaulting unset fields. No-op without a current topic.
    pub fn update_learning_style(&mut self, update: LearningStyleUpdate) {
        let Some(current_id) = self.current_topic.as_ref().map(|topic| topic.id.clone()) else {
            error!("Cannot update learning style: no current topic");
            return;
        };
        let Some(topic) = self.topics.iter_mut().find(|topic| topic.id == current_id) else {
            error!(topic_id = %current_id, "Cannot update learning style: topic not found");
            return;
        };
        let base = topic.learning_style.unwrap_or_default();
        topic.learning_style = Some(base.merged(update));
        self.persist_topics();
        self.sync_current();
    }

    /// Effective learning style of the current topic, defaulted when unset.
    pub fn current_learning_style(&self) -> Option<LearningStyle> {
        self.current_topic
            .as_ref()
            .map(|topic| topic.learning_style.unwrap_or_default())
    }

    fn persist_topics(&self) {
        if let Err(storage_error) = self.storage.save_topics(&self.topics) {
            error!(%storage_error, "Failed to persist topics");
        }
    }

    fn persist_current_topic_id(&self) {
        let id = self.current_topic.as_ref().map(|topic| topic.id.as_str());
        if let Err(storage_error) = self.storage.save_current_topic_id(id) {
            error!(%storage_error, "Failed to persist current topic selection");
        }
    }

    fn sync_current(&mut self) {
        if let Some(id) = self.current_topic.as_ref().map(|topic| topic.id.clone()) {
            self.current_topic = self.topics.iter().find(|topic| topic.id == id).cloned();
        }
    }
}
