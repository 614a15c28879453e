//! Learnie Core Library
//!
//! State management and AI orchestration for the Learnie learning app: the
//! topic content model, the agent provider interface with its direct and
//! remote implementations, the provider factory, and the persisted topic
//! state store. HTTP surfaces live in the service crates; this crate is
//! transport-agnostic.

pub mod agent;
pub mod block;
pub mod error;
pub mod factory;
pub mod llm_json;
pub mod openai_agent;
pub mod prompts;
pub mod remote_agent;
pub mod storage;
pub mod store;
pub mod topic;
