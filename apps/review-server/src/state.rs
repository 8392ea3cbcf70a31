//! Application state.

use std::sync::Arc;

use review_store::ReviewStore;

use crate::config::Config;
use crate::services::AssignmentEngine;

/// Shared application state.
pub struct AppState<S: ReviewStore> {
    /// Server configuration.
    pub config: Config,
    /// Review store.
    pub store: S,
}

impl<S: ReviewStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    /// Returns an assignment engine bound to this state's store and deadline.
    pub fn assignment(&self) -> AssignmentEngine<'_, S> {
        AssignmentEngine::new(&self.store, self.config.operation_timeout)
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config and store.
pub fn create_shared_state<S: ReviewStore>(config: Config, store: S) -> SharedState<S> {
    Arc::new(AppState::new(config, store))
}
