//! Pricing configuration: volume tiers and discount thresholds.
//!
//! Configuration is injected into the engine; the YAML loader is a
//! convenience for hosts that keep it in a file.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{MultiCountryDiscount, PricingConfig, VolumeDiscount, VolumeTier};
