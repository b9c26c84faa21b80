//! Filing service and additional-service models.

use serde::{Deserialize, Serialize};

use crate::models::money::Money;

/// A filing service a customer can order (e.g. standard VAT filing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingService {
    /// Unique service identifier.
    pub id: String,
    /// Human-readable service name.
    pub name: String,
    /// The base price before volume scaling and rule adjustments.
    pub base_price: Money,
    /// Relative complexity of the service; bound as `complexityLevel`
    /// for rule expressions.
    pub complexity_level: u8,
}

/// An optional add-on service (e.g. registration, fiscal representation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalService {
    /// Unique service identifier.
    pub id: String,
    /// Human-readable service name.
    pub name: String,
    /// Flat cost, charged once per request.
    pub cost: Money,
}
