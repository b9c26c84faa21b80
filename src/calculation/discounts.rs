//! Discount computation.
//!
//! Discounts are negative line items against the pre-discount total
//! (country subtotals plus additional services), never against individual
//! country subtotals, so the per-country breakdown stays auditable.

use crate::config::PricingConfig;
use crate::models::{DiscountLine, Money};

/// Name of the volume discount line.
pub const VOLUME_DISCOUNT_NAME: &str = "volume";
/// Name of the multi-country discount line.
pub const MULTI_COUNTRY_DISCOUNT_NAME: &str = "multi_country";

/// Computes the applicable discount lines for a request.
///
/// Both discounts are percentages of the same pre-discount total; the
/// volume discount is listed first. Amounts are negative.
pub fn compute_discounts(
    pre_discount_total: &Money,
    country_count: usize,
    transaction_volume: u32,
    config: &PricingConfig,
) -> Vec<DiscountLine> {
    let mut discounts = Vec::new();

    if let Some(volume) = config.volume_discount() {
        if transaction_volume >= volume.min_volume {
            discounts.push(DiscountLine {
                name: VOLUME_DISCOUNT_NAME.to_string(),
                amount: pre_discount_total.percentage(volume.percentage).negate(),
            });
        }
    }

    if let Some(multi) = config.multi_country_discount() {
        if country_count >= multi.min_countries {
            discounts.push(DiscountLine {
                name: MULTI_COUNTRY_DISCOUNT_NAME.to_string(),
                amount: pre_discount_total.percentage(multi.percentage).negate(),
            });
        }
    }

    discounts
}
