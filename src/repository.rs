//! External collaborator interfaces.
//!
//! The core consumes countries, services, and rule snapshots through these
//! traits and never owns their persistence, versioning, or editorial
//! workflow. The in-memory implementations below are for hosts and tests;
//! a production deployment would back them with its own storage.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult, ReferenceKind};
use crate::models::{AdditionalService, Country, CountryCode, FilingService, RuleSnapshot};

/// Read-only access to country master data.
pub trait CountryRepository: Send + Sync {
    /// Resolves a country as of the given date.
    fn get(&self, code: &CountryCode, as_of: NaiveDate) -> EngineResult<Country>;
}

/// Read-only access to the filing-service catalog.
pub trait ServiceRepository: Send + Sync {
    /// Resolves a filing service by id.
    fn get(&self, service_id: &str) -> EngineResult<FilingService>;
}

/// Read-only access to the additional-service catalog.
pub trait AdditionalServiceRepository: Send + Sync {
    /// Resolves an additional service by id.
    fn get(&self, service_id: &str) -> EngineResult<AdditionalService>;
}

/// Produces frozen, versioned rule snapshots.
///
/// The repository owns versioning; the engine takes exactly one snapshot
/// per calculation and never fetches rule-by-rule data mid-flight.
pub trait RuleRepository: Send + Sync {
    /// Returns a self-consistent snapshot covering the given countries.
    fn snapshot(
        &self,
        country_codes: &BTreeSet<CountryCode>,
        as_of: NaiveDate,
    ) -> EngineResult<Arc<RuleSnapshot>>;
}

/// In-memory country repository.
#[derive(Debug, Default)]
pub struct InMemoryCountryRepository {
    countries: HashMap<CountryCode, Country>,
}

impl InMemoryCountryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a country, replacing any previous entry for its code.
    pub fn with_country(mut self, country: Country) -> Self {
        self.countries.insert(country.code.clone(), country);
        self
    }
}

impl CountryRepository for InMemoryCountryRepository {
    fn get(&self, code: &CountryCode, _as_of: NaiveDate) -> EngineResult<Country> {
        self.countries
            .get(code)
            .cloned()
            .ok_or_else(|| EngineError::UnknownReference {
                kind: ReferenceKind::Country,
                id: code.to_string(),
            })
    }
}

/// In-memory filing-service repository.
#[derive(Debug, Default)]
pub struct InMemoryServiceRepository {
    services: HashMap<String, FilingService>,
}

impl InMemoryServiceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service, replacing any previous entry for its id.
    pub fn with_service(mut self, service: FilingService) -> Self {
        self.services.insert(service.id.clone(), service);
        self
    }
}

impl ServiceRepository for InMemoryServiceRepository {
    fn get(&self, service_id: &str) -> EngineResult<FilingService> {
        self.services
            .get(service_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownReference {
                kind: ReferenceKind::Service,
                id: service_id.to_string(),
            })
    }
}

/// In-memory additional-service repository.
#[derive(Debug, Default)]
pub struct InMemoryAdditionalServiceRepository {
    services: HashMap<String, AdditionalService>,
}

impl InMemoryAdditionalServiceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an additional service, replacing any previous entry.
    pub fn with_service(mut self, service: AdditionalService) -> Self {
        self.services.insert(service.id.clone(), service);
        self
    }
}

impl AdditionalServiceRepository for InMemoryAdditionalServiceRepository {
    fn get(&self, service_id: &str) -> EngineResult<AdditionalService> {
        self.services
            .get(service_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownReference {
                kind: ReferenceKind::AdditionalService,
                id: service_id.to_string(),
            })
    }
}

/// In-memory rule repository holding one current snapshot.
///
/// [`publish`](Self::publish) swaps in a new snapshot atomically;
/// calculations already holding the previous `Arc` are unaffected, which
/// is exactly the consistency model the engine relies on.
#[derive(Debug)]
pub struct InMemoryRuleRepository {
    current: RwLock<Arc<RuleSnapshot>>,
}

impl InMemoryRuleRepository {
    /// Creates a repository serving the given snapshot.
    pub fn new(snapshot: RuleSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Replaces the current snapshot with a new version.
    pub fn publish(&self, snapshot: RuleSnapshot) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// Returns the current snapshot version.
    pub fn current_version(&self) -> String {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.version().to_string()
    }
}

impl RuleRepository for InMemoryRuleRepository {
    fn snapshot(
        &self,
        _country_codes: &BTreeSet<CountryCode>,
        _as_of: NaiveDate,
    ) -> EngineResult<Arc<RuleSnapshot>> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(&guard))
    }
}
