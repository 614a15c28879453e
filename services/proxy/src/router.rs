//! Axum Router Configuration
//!
//! A single fallback route: everything the proxy receives, whatever the
//! method or path, goes through the relay handler.

use crate::{relay::relay, state::AppState};
use axum::Router;

/// Creates the main Axum router for the proxy.
pub fn create_router(state: AppState) -> Router {
    Router::new().fallback(relay).with_state(state)
}
