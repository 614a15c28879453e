//! Learnie Proxy Library Crate
//!
//! This library contains the logic for the Learnie upstream proxy: the
//! configuration, the shared state, the relay handler, and the routing.
//! The `proxy` binary is a thin wrapper around this library.

pub mod config;
pub mod relay;
pub mod router;
pub mod state;
