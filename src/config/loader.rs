//! Configuration loading functionality.
//!
//! Loads the pricing configuration from a YAML file and validates it.
//!
//! # File format
//!
//! ```yaml
//! tiers:
//!   - min_volume: 0
//!     multiplier: "1.0"
//!   - min_volume: 101
//!     multiplier: "1.25"
//! multi_country_discount:
//!   min_countries: 2
//!   percentage: "5"
//! volume_discount:
//!   min_volume: 1000
//!   percentage: "3"
//! ```

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{PricingConfig, RawPricingConfig};

/// Loads a [`PricingConfig`] from a YAML file.
///
/// # Example
///
/// ```no_run
/// use pricing_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/pricing.yaml")?;
/// # Ok::<(), pricing_engine::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads, parses, and validates the configuration file.
    ///
    /// Returns `ConfigNotFound` if the file is missing and `ConfigParse`
    /// if the YAML is malformed or the configuration fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<PricingConfig> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let raw: RawPricingConfig =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParse {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        PricingConfig::new(raw.tiers, raw.multi_country_discount, raw.volume_discount).map_err(
            |e| match e {
                // Attach the real file path to validation failures.
                EngineError::ConfigParse { message, .. } => EngineError::ConfigParse {
                    path: path_str.clone(),
                    message,
                },
                other => other,
            },
        )
    }
}
