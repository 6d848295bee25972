//! Dyn Crab
//!
//! A small DynDNS2 compatible update server. Routers and update clients call the
//! [`/nic/update` endpoint][crate::api] with a list of hostnames; each hostname is routed to the
//! first configured [provider][crate::provider] managing a zone that contains it, and the
//! resulting record writes run concurrently, bounded by a [`Gate`].
//!
//! The built-in [`local`][crate::provider::LocalProvider] provider keeps records in a
//! [record store][crate::record_store] that an optional authoritative [DNS server][crate::dns]
//! answers from.
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod client_ip;
pub mod config;
pub mod dns;
pub mod error;
pub mod gate;
pub mod provider;
pub mod record;
pub mod record_store;
pub mod reply;
pub mod update;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::new as new_dns;
pub use gate::Gate;
pub use provider::{Provider, Registry};
pub use record::Record;
pub use record_store::{FileRecordStore, InMemoryRecordStore};
pub use reply::ReturnCode;
