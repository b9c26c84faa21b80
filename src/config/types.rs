//! Configuration types for the pricing engine.
//!
//! Volume-tier boundaries and discount thresholds are external
//! configuration injected into the engine, never hard-coded in the
//! calculation path.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// A volume tier: requests with `transaction_volume >= min_volume` (and
/// below the next tier's boundary) scale the base price by `multiplier`.
///
/// Lower bounds are inclusive; a volume exactly on a boundary falls into
/// the higher tier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VolumeTier {
    /// Inclusive lower volume bound.
    pub min_volume: u32,
    /// The base-price multiplier for this tier.
    pub multiplier: Decimal,
}

/// A percentage discount granted when a request spans at least
/// `min_countries` countries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiCountryDiscount {
    /// Minimum number of selected countries.
    pub min_countries: usize,
    /// Discount percentage in `[0, 100]`.
    pub percentage: Decimal,
}

/// A percentage discount granted when `transaction_volume` reaches
/// `min_volume`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VolumeDiscount {
    /// Minimum transaction volume.
    pub min_volume: u32,
    /// Discount percentage in `[0, 100]`.
    pub percentage: Decimal,
}

/// The complete pricing configuration.
///
/// Construct through [`PricingConfig::new`] (or the YAML loader), which
/// validates the tier table and discount percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    tiers: Vec<VolumeTier>,
    multi_country_discount: Option<MultiCountryDiscount>,
    volume_discount: Option<VolumeDiscount>,
}

impl PricingConfig {
    /// Creates a validated configuration.
    ///
    /// The tier table must be non-empty, start at `min_volume = 0`, be
    /// strictly ascending, and carry positive multipliers. Discount
    /// percentages must lie in `[0, 100]`.
    pub fn new(
        tiers: Vec<VolumeTier>,
        multi_country_discount: Option<MultiCountryDiscount>,
        volume_discount: Option<VolumeDiscount>,
    ) -> EngineResult<Self> {
        if tiers.is_empty() {
            return Err(config_invalid("tiers must not be empty"));
        }
        if tiers[0].min_volume != 0 {
            return Err(config_invalid("first tier must start at min_volume 0"));
        }
        for window in tiers.windows(2) {
            if window[0].min_volume >= window[1].min_volume {
                return Err(config_invalid("tier boundaries must be strictly ascending"));
            }
        }
        for tier in &tiers {
            if tier.multiplier <= Decimal::ZERO {
                return Err(config_invalid(format!(
                    "tier at volume {} has non-positive multiplier",
                    tier.min_volume
                )));
            }
        }
        if let Some(discount) = &multi_country_discount {
            validate_percentage("multi_country_discount", discount.percentage)?;
            if discount.min_countries < 2 {
                return Err(config_invalid(
                    "multi_country_discount.min_countries must be at least 2",
                ));
            }
        }
        if let Some(discount) = &volume_discount {
            validate_percentage("volume_discount", discount.percentage)?;
        }

        Ok(Self {
            tiers,
            multi_country_discount,
            volume_discount,
        })
    }

    /// Returns the multiplier of the tier covering `transaction_volume`.
    ///
    /// Tiers are sorted by ascending lower bound, so the applicable tier
    /// is the last one whose bound is at or below the volume; a volume
    /// exactly on a boundary therefore resolves to the higher tier.
    pub fn tier_multiplier(&self, transaction_volume: u32) -> Decimal {
        self.tiers
            .iter()
            .rfind(|tier| tier.min_volume <= transaction_volume)
            .map(|tier| tier.multiplier)
            // The first tier starts at 0, so rfind always matches.
            .unwrap_or(Decimal::ONE)
    }

    /// Returns the volume tiers.
    pub fn tiers(&self) -> &[VolumeTier] {
        &self.tiers
    }

    /// Returns the multi-country discount, if configured.
    pub fn multi_country_discount(&self) -> Option<&MultiCountryDiscount> {
        self.multi_country_discount.as_ref()
    }

    /// Returns the volume discount, if configured.
    pub fn volume_discount(&self) -> Option<&VolumeDiscount> {
        self.volume_discount.as_ref()
    }
}

fn config_invalid(message: impl Into<String>) -> EngineError {
    EngineError::ConfigParse {
        path: "<pricing config>".to_string(),
        message: message.into(),
    }
}

fn validate_percentage(name: &str, percentage: Decimal) -> EngineResult<()> {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        Err(config_invalid(format!(
            "{name}.percentage {percentage} is outside [0, 100]"
        )))
    } else {
        Ok(())
    }
}

/// Raw deserialized shape of the configuration file; turned into a
/// validated [`PricingConfig`] by the loader.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPricingConfig {
    pub tiers: Vec<VolumeTier>,
    #[serde(default)]
    pub multi_country_discount: Option<MultiCountryDiscount>,
    #[serde(default)]
    pub volume_discount: Option<VolumeDiscount>,
}
