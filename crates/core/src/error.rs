//! Error Taxonomy
//!
//! Failures fall into a small number of classes: configuration problems that
//! abort before any network call, generation failures from an upstream model,
//! malformed model output, and lookups that miss. Store mutations deliberately
//! do not use these types; a missing id there is logged and becomes a no-op.

use thiserror::Error;

/// Lookup failures inside a topic tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopicError {
    #[error("Subtopic with ID {0} not found in any section")]
    SubtopicNotFound(String),
    #[error("Subtopic with ID {subtopic} not found in topic {topic}")]
    SectionNotFound { topic: String, subtopic: String },
}

/// Errors produced by the provider layer.
///
/// `Parse` and `Completion` are generation-class failures: callers recover
/// from them the same way they recover from `Generation`, by surfacing the
/// error and discarding the partial result. They are never retried here.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Bad or missing credential, unknown provider kind. Fails before any
    /// network call is made.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Empty or structurally invalid upstream response.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The model produced text that is not valid JSON.
    #[error("Failed to parse model output as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A chat-completion request could not be built or executed.
    #[error("Chat completion request failed: {0}")]
    Completion(#[from] async_openai::error::OpenAIError),

    /// HTTP transport failure talking to the remote agent service.
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Lookup(#[from] TopicError),

    /// The provider declines this capability.
    #[error("Operation is not supported by this provider")]
    NotSupported,
}

impl AgentError {
    /// True for failures that happen before any network I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AgentError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_error_display() {
        let err = TopicError::SubtopicNotFound("s1-t9".to_string());
        assert_eq!(
            format!("{err}"),
            "Subtopic with ID s1-t9 not found in any section"
        );

        let err = TopicError::SectionNotFound {
            topic: "rust-101".to_string(),
            subtopic: "s1-t9".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Subtopic with ID s1-t9 not found in topic rust-101"
        );
    }

    #[test]
    fn lookup_errors_convert_into_agent_errors() {
        let err: AgentError = TopicError::SubtopicNotFound("x".to_string()).into();
        assert!(matches!(err, AgentError::Lookup(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn configuration_errors_are_flagged_as_pre_network() {
        let err = AgentError::Configuration("missing API key".to_string());
        assert!(err.is_configuration());
    }
}
