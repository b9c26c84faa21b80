//! Resolution of additional-service costs.
//!
//! Additional services are charged once per request at their nominal
//! cost. A country-level `Complexity` rule can additionally surcharge
//! that country's share; that happens during the per-country pass, not
//! here.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::EngineResult;
use crate::models::{CurrencyCode, Money};
use crate::repository::AdditionalServiceRepository;

/// The resolved additional services of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalServiceCosts {
    /// Cost per additional-service id, in request order (ascending id).
    pub costs: BTreeMap<String, Money>,
    /// The sum of all costs.
    pub total: Money,
}

/// Resolves every requested additional service and totals their costs.
///
/// Fails with `UnknownReference` for a dangling id and with
/// `CurrencyMismatch` if a repository-supplied cost is not denominated in
/// the request currency (conversion is an upstream concern).
pub fn resolve_additional_services(
    service_ids: &BTreeSet<String>,
    repository: &dyn AdditionalServiceRepository,
    currency: &CurrencyCode,
) -> EngineResult<AdditionalServiceCosts> {
    let mut costs = BTreeMap::new();
    let mut total = Money::zero(currency.clone());

    for id in service_ids {
        let service = repository.get(id)?;
        total = total.add(&service.cost)?;
        costs.insert(service.id, service.cost);
    }

    Ok(AdditionalServiceCosts { costs, total })
}
