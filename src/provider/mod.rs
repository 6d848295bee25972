//! DNS backends.
//!
//! Every backend implements [`Provider`]. A provider declares which operations it really offers
//! through [`Provider::capabilities`]; the [`Registry`] refuses providers that don't offer every
//! capability in [`REQUIRED_CAPABILITIES`], naming the missing ones in the error.
//!
//! Two providers are built in:
//!
//! * [`local::LocalProvider`] writes into dyncrab's own
//!   [record store][crate::record_store], which the [DNS server][crate::dns] answers from.
//! * [`static_zones::StaticZonesProvider`] wraps another provider, answering zone listings from a
//!   fixed list. Use it for backends that can't list their zones.

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::record::Record;
use crate::record_store::DynRecordStore;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod local;
pub mod static_zones;

pub use local::LocalProvider;
pub use static_zones::StaticZonesProvider;

/// `DynProvider` is a type alias for a shareable [`Provider`] trait object.
#[allow(clippy::module_name_repetitions)]
pub type DynProvider = Arc<dyn Provider>;

/// `SharedRegistry` is the [`Registry`] handed to every request.
pub type SharedRegistry = Arc<Registry>;

/// A single operation a [`Provider`] may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    RecordGetter,
    RecordAppender,
    RecordSetter,
    RecordDeleter,
    ZoneLister,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Capabilities for working with records in a known zone.
pub const RECORD_CAPABILITIES: [Capability; 4] = [
    Capability::RecordGetter,
    Capability::RecordAppender,
    Capability::RecordSetter,
    Capability::RecordDeleter,
];

/// Capabilities a provider needs to be admitted to the [`Registry`].
pub const REQUIRED_CAPABILITIES: [Capability; 5] = [
    Capability::RecordGetter,
    Capability::RecordAppender,
    Capability::RecordSetter,
    Capability::RecordDeleter,
    Capability::ZoneLister,
];

/// An async trait describing a DNS backend. Zone names are passed without trailing root
/// separator, record names are relative to their zone.
///
/// Operations may be called concurrently for different zones. Each call fails on its own, and
/// none of them is retried by the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A stable name used in logs and errors.
    fn name(&self) -> String;

    /// The operations this provider actually implements.
    fn capabilities(&self) -> Vec<Capability>;

    /// List the zones this provider can write into.
    async fn list_zones(&self) -> Result<Vec<String>, Error> {
        Err(self.unsupported(Capability::ZoneLister))
    }

    /// Get every record in `zone`.
    async fn get_records(&self, _zone: &str) -> Result<Vec<Record>, Error> {
        Err(self.unsupported(Capability::RecordGetter))
    }

    /// Add `records` to `zone`, returning the records that were added.
    async fn append_records(&self, _zone: &str, _records: &[Record]) -> Result<Vec<Record>, Error> {
        Err(self.unsupported(Capability::RecordAppender))
    }

    /// Replace the records with the same name and type as `records` in `zone`, returning the
    /// records that were written.
    async fn set_records(&self, _zone: &str, _records: &[Record]) -> Result<Vec<Record>, Error> {
        Err(self.unsupported(Capability::RecordSetter))
    }

    /// Remove `records` from `zone`, returning the records that were removed.
    async fn delete_records(&self, _zone: &str, _records: &[Record]) -> Result<Vec<Record>, Error> {
        Err(self.unsupported(Capability::RecordDeleter))
    }

    fn unsupported(&self, capability: Capability) -> Error {
        Error::Unsupported {
            provider: self.name(),
            capability,
        }
    }
}

/// Check that `provider` offers every capability in `required`.
///
/// # Errors
///
/// Returns [`Error::MissingCapabilities`] listing each capability the provider lacks.
pub fn admit(provider: &dyn Provider, required: &[Capability]) -> Result<(), Error> {
    let offered = provider.capabilities();
    let missing: Vec<Capability> = required
        .iter()
        .filter(|capability| !offered.contains(*capability))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingCapabilities {
            provider: provider.name(),
            missing,
        })
    }
}

/// The configured providers, in declaration order. Built once at startup, read only afterwards.
#[derive(Clone)]
pub struct Registry {
    providers: Vec<DynProvider>,
}

impl Registry {
    /// Admit `providers` in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoProviders`] for an empty list, or [`Error::MissingCapabilities`] for the
    /// first provider that fails admission.
    pub fn new(providers: Vec<DynProvider>) -> Result<Self, Error> {
        if providers.is_empty() {
            return Err(Error::NoProviders);
        }
        for provider in &providers {
            admit(provider.as_ref(), &REQUIRED_CAPABILITIES)?;
        }
        Ok(Registry { providers })
    }

    /// Build every configured provider on top of `record_store`.
    ///
    /// # Errors
    ///
    /// See [`Registry::new`] and [`ProviderConfig::build`].
    pub fn from_config(
        configs: &[ProviderConfig],
        record_store: &DynRecordStore,
    ) -> Result<Self, Error> {
        let providers = configs
            .iter()
            .map(|config| config.build(record_store))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&DynProvider> {
        self.providers.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynProvider> {
        self.providers.iter()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|provider| provider.name()))
            .finish()
    }
}
