//! Response Normalizer
//!
//! Models answer with raw JSON or with JSON wrapped in a ```json fenced code
//! block. Every provider routes every completion through this module before
//! treating content as a typed entity; it is the single point where opaque
//! text becomes structured data.

use crate::error::AgentError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Strips a markdown ```json fence if present and parses the remainder.
pub fn parse_value(text: &str) -> Result<Value, AgentError> {
    let extracted = extract_json_from_markdown(text);
    Ok(serde_json::from_str(extracted)?)
}

/// Typed variant of [`parse_value`].
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<T, AgentError> {
    let extracted = extract_json_from_markdown(text);
    Ok(serde_json::from_str(extracted)?)
}

fn extract_json_from_markdown(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with("```json") {
        let start = trimmed.find('\n').map(|index| index + 1);
        let end = trimmed.rfind("```");
        match (start, end) {
            (Some(start), Some(end)) if end > start => {
                return trimmed[start..end].trim();
            }
            _ => {
                warn!("Markdown JSON format detected but could not extract content properly");
            }
        }
    }
    trimmed
}
