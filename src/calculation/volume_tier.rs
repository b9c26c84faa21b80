//! Volume-tier scaling of the service base price.

use rust_decimal::Decimal;

use crate::config::PricingConfig;
use crate::models::{FilingService, Money};

/// The result of applying the volume-tier table to a base price.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeScaledBase {
    /// The tier multiplier that was applied.
    pub multiplier: Decimal,
    /// The scaled base price.
    pub price: Money,
}

/// Applies the configured volume tier to the service's base price.
///
/// Tier boundaries come from the injected [`PricingConfig`]; the engine
/// hard-codes nothing. Lower bounds are inclusive, so a volume exactly on
/// a boundary resolves to the higher tier.
pub fn scale_base_price(
    service: &FilingService,
    transaction_volume: u32,
    config: &PricingConfig,
) -> VolumeScaledBase {
    let multiplier = config.tier_multiplier(transaction_volume);
    VolumeScaledBase {
        multiplier,
        price: service.base_price.mul(multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PricingConfig, VolumeTier};
    use crate::models::CurrencyCode;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_config() -> PricingConfig {
        PricingConfig::new(
            vec![
                VolumeTier {
                    min_volume: 0,
                    multiplier: dec("1.0"),
                },
                VolumeTier {
                    min_volume: 101,
                    multiplier: dec("1.25"),
                },
                VolumeTier {
                    min_volume: 501,
                    multiplier: dec("1.5"),
                },
            ],
            None,
            None,
        )
        .unwrap()
    }

    fn create_test_service(base: &str) -> FilingService {
        FilingService {
            id: "standard_filing".to_string(),
            name: "Standard VAT Filing".to_string(),
            base_price: Money::new(dec(base), CurrencyCode::new("EUR").unwrap()),
            complexity_level: 2,
        }
    }

    /// Volume 150 falls into the 101+ tier: 800 * 1.25 = 1000.
    #[test]
    fn test_volume_150_scales_800_to_1000() {
        let scaled = scale_base_price(&create_test_service("800"), 150, &create_test_config());
        assert_eq!(scaled.multiplier, dec("1.25"));
        assert_eq!(scaled.price.amount(), dec("1000.00"));
    }

    #[test]
    fn test_boundary_volume_takes_higher_tier() {
        let config = create_test_config();
        let service = create_test_service("800");
        assert_eq!(scale_base_price(&service, 100, &config).multiplier, dec("1.0"));
        assert_eq!(scale_base_price(&service, 101, &config).multiplier, dec("1.25"));
    }

    #[test]
    fn test_zero_volume_uses_base_tier() {
        let scaled = scale_base_price(&create_test_service("800"), 0, &create_test_config());
        assert_eq!(scaled.price.amount(), dec("800.0"));
    }

    proptest! {
        /// Increasing the volume never decreases the scaled base price.
        #[test]
        fn prop_scaled_base_is_monotone_in_volume(volume in 0u32..10_000, step in 0u32..5_000) {
            let config = create_test_config();
            let service = create_test_service("800");

            let lower = scale_base_price(&service, volume, &config);
            let higher = scale_base_price(&service, volume + step, &config);
            prop_assert!(higher.price.amount() >= lower.price.amount());
        }

        /// Within one tier the scaled price does not change at all.
        #[test]
        fn prop_price_constant_within_tier(volume in 101u32..=500) {
            let config = create_test_config();
            let service = create_test_service("800");
            let scaled = scale_base_price(&service, volume, &config);
            prop_assert_eq!(scaled.price.amount(), dec("1000.00"));
        }
    }
}
