//! Application state for the pricing API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::PricingEngine;

/// Shared application state.
///
/// Contains the pricing engine shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<PricingEngine>,
}

impl AppState {
    /// Creates a new application state around the given engine.
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns a reference to the pricing engine.
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
