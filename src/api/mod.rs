//! HTTP API module for the Pricing Calculation Core.
//!
//! This module provides the REST endpoints for calculating and
//! explaining cost estimates.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::ApiError;
pub use state::AppState;
