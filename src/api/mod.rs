//! DynDNS2 compatible HTTP API.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/nic/update` and `/update` (GET)
//!
//!   Expects the query parameter `hostname`, a comma separated list of the hostnames to point at
//!   the client's address. When [users][crate::config::Config::users] are configured, requests
//!   must carry matching basic-auth credentials.
//!
//!   ```bash
//!   ❯ curl -u router:hunter2 'http://localhost:8245/nic/update?hostname=home.dyn.example.com,nas.dyn.example.com'
//!   good 203.0.113.9
//!   nochg 203.0.113.9
//!   ```
//!
//!   The response status is always HTTP 200 (OK). The body holds one line per hostname, in
//!   request order, with one of the [return codes][crate::reply::ReturnCode]:
//!
//!   * `good <ip>`: the record was updated.
//!   * `nochg <ip>`: the record already pointed at the address.
//!   * `nohost`: no provider manages a zone containing the hostname.
//!   * `dnserr`: the provider failed, or the client's address couldn't be determined.
//!
//!   A single `badauth` line is returned for failed authorization, a single `notfqdn` line when
//!   `hostname` is missing.
//!
//!   The published address is the connection's peer address. Peers within
//!   [`trusted_remotes`][crate::config::Config::trusted_remotes] may pass a different one with
//!   the `myip` parameter or an `X-Forwarded-For` header, see [`crate::client_ip`].

mod auth;
mod routes;
pub mod server;

pub use auth::{authorize, Credentials};
pub use routes::{handle_update, parse_hostnames, UpdateParams};
pub use server::{new, AppState};
