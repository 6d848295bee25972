//! Error types.

use crate::provider::Capability;
use trust_dns_server::proto::error::ProtoError;

/// Error enumerates the possible dyncrab error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the configuration doesn't list any
    /// [providers][`crate::config::Config::providers`].
    #[error("no DNS providers defined")]
    NoProviders,

    /// Returned when building the [`Registry`][`crate::provider::Registry`] and a provider lacks
    /// one or more of the capabilities every provider must offer. Lists exactly which are missing.
    #[error("DNS provider {provider} should implement {}", describe_missing(.missing))]
    MissingCapabilities {
        provider: String,
        missing: Vec<Capability>,
    },

    /// Returned by a [`Provider`][`crate::provider::Provider`] operation the provider doesn't
    /// support.
    #[error("DNS provider {provider} does not implement {capability}")]
    Unsupported {
        provider: String,
        capability: Capability,
    },

    /// Returned when a provider is asked to write into a zone it doesn't manage.
    #[error("zone \"{0}\" is not managed by this provider")]
    UnknownZone(String),

    /// Returned by a provider backend that failed to carry out an operation.
    #[error("DNS provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// Returned when a dispatched update job could not run to completion.
    #[error("update job failed: {0}")]
    JobFailed(String),

    /// Returned when a candidate client address from the transport, the `myip` parameter or a
    /// forwarding header can't be parsed as an IP address.
    #[error("invalid client address \"{0}\"")]
    InvalidClientAddress(String),

    /// Returned when only public client addresses are acceptable and none could be found, not even
    /// for the server itself.
    #[error("no public address found, resolved {0} instead")]
    NoPublicAddress(std::net::IpAddr),

    /// Returned when a configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g. to
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or to
    /// [trying to load a `FileRecordStore`][crate::record_store::file::FileRecordStore::try_from_file])
    /// fails due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the dyncrab DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}

fn describe_missing(missing: &[Capability]) -> String {
    let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
    let mut out = match names.as_slice() {
        [single] => single.clone(),
        _ => format!("{{{}}}", names.join(", ")),
    };
    if missing.contains(&Capability::ZoneLister) {
        out.push_str(" (use provider static_zones to manually define zones)");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_capabilities_lists_every_operation() {
        let err = Error::MissingCapabilities {
            provider: "hetzner".to_string(),
            missing: vec![Capability::RecordDeleter, Capability::ZoneLister],
        };
        assert_eq!(
            err.to_string(),
            "DNS provider hetzner should implement {RecordDeleter, ZoneLister} \
             (use provider static_zones to manually define zones)"
        );
    }

    #[test]
    fn single_missing_capability_is_not_braced() {
        let err = Error::MissingCapabilities {
            provider: "hetzner".to_string(),
            missing: vec![Capability::RecordSetter],
        };
        assert_eq!(
            err.to_string(),
            "DNS provider hetzner should implement RecordSetter"
        );
    }
}
