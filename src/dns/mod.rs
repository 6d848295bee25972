//! Authoritative DNS server for the zones held by the built-in
//! [record store][crate::record_store].
//!
//! Only started when the [`dns`][`crate::config::Config::dns`] config section is present. The
//! served zones are those of every [`local`][crate::provider::LocalProvider] provider, including
//! local providers wrapped by [`static_zones`][crate::provider::StaticZonesProvider].
//!
//! # A/AAAA
//!
//! `A` and `AAAA` queries are answered with the addresses published through the
//! [update endpoint][crate::api#nicupdate-get], using the TTL they were stored with. A name
//! without addresses of the queried type gets `NXDOMAIN`.
//!
//! E.g. after a router published `203.0.113.9` for `home.dyn.example.com`:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 home.dyn.example.com +short A
//! 203.0.113.9
//! ```
//!
//! # SOA
//!
//! `SOA` queries for a zone apex are answered using the
//! [`DnsConfig::ns_domain`][`crate::config::DnsConfig::ns_domain`] and
//! [`DnsConfig::ns_admin`][`crate::config::DnsConfig::ns_admin`] settings.
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 dyn.example.com +short SOA
//! ns1.example.com. dns-admin.example.com. 20230312 86400 7200 3600000 172800
//! ```
//!
//! _Note: The zone serial (`20230312`) will differ based on the date the query is performed._
//!
//! Any other query type, or a request that isn't a query, gets `NOTIMP`.

mod handlers;
pub mod server;

pub use handlers::Handler;
pub use server::new;
