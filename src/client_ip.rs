//! Determine the address an update request publishes.
//!
//! The transport peer is only believed about someone else's address when it sits inside one of
//! the [trusted remotes][`crate::config::Config::trusted_remotes`]. A trusted peer may state the
//! address with the `myip` query parameter, or relay it through `X-Forwarded-For`.

use crate::error::Error;
use axum::http::HeaderMap;
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use tokio::net::UdpSocket;
use tracing::debug;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

lazy_static! {
    // Ranges the std `is_*` helpers don't cover yet (RFC 6598, RFC 4193, RFC 4291 link local).
    static ref NON_PUBLIC_NETWORKS: [IpNetwork; 3] = [
        IpNetwork::from_str("100.64.0.0/10").unwrap(),
        IpNetwork::from_str("fc00::/7").unwrap(),
        IpNetwork::from_str("fe80::/10").unwrap(),
    ];
    // Never contacted, only used to pick the outbound interface.
    static ref ROUTE_PROBE_V4: SocketAddr = SocketAddr::from_str("192.0.2.1:9").unwrap();
    static ref ROUTE_PROBE_V6: SocketAddr = SocketAddr::from_str("[2001:db8::1]:9").unwrap();
}

/// True when `ip` is routable on the public internet.
pub fn is_public(ip: IpAddr) -> bool {
    let special = match ip {
        IpAddr::V4(v4) => {
            v4.is_unspecified()
                || v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_multicast()
        }
        IpAddr::V6(v6) => v6.is_unspecified() || v6.is_loopback() || v6.is_multicast(),
    };
    !special && !NON_PUBLIC_NETWORKS.iter().any(|net| net.contains(ip))
}

/// Parse a candidate address: a bare IP, or an IP with a port as proxies sometimes send.
fn parse_candidate(value: &str) -> Result<IpAddr, Error> {
    let value = value.trim();
    IpAddr::from_str(value)
        .or_else(|_| SocketAddr::from_str(value).map(|addr| addr.ip()))
        .map_err(|_| Error::InvalidClientAddress(value.to_string()))
}

/// Every hop listed in the forwarding headers, leftmost (originating client) first.
fn forwarded_chain(headers: &HeaderMap) -> Result<Vec<IpAddr>, Error> {
    let mut chain = vec![];
    for value in headers.get_all(FORWARDED_FOR) {
        let value = value
            .to_str()
            .map_err(|_| Error::InvalidClientAddress(format!("{value:?}")))?;
        for hop in value.split(',').filter(|hop| !hop.trim().is_empty()) {
            chain.push(parse_candidate(hop)?);
        }
    }
    Ok(chain)
}

/// The address this server itself goes out with.
async fn resolve_this(ipv6: bool) -> Result<IpAddr, Error> {
    let (bind, probe) = if ipv6 {
        ("[::]:0", *ROUTE_PROBE_V6)
    } else {
        ("0.0.0.0:0", *ROUTE_PROBE_V4)
    };
    let socket = UdpSocket::bind(bind).await?;
    socket.connect(probe).await?;
    let ip = socket.local_addr()?.ip();
    if !is_public(ip) {
        return Err(Error::NoPublicAddress(ip));
    }
    Ok(ip)
}

/// Trust boundary applied to each request.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    trusted: &'a [IpNetwork],
    public_only: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(trusted: &'a [IpNetwork], public_only: bool) -> Self {
        Resolver {
            trusted,
            public_only,
        }
    }

    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted.iter().any(|net| net.contains(ip))
    }

    /// Pick the address to publish for a request from `remote`. A declared `myip` that isn't
    /// public is skipped when only public addresses are wanted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidClientAddress`] if `myip` or a forwarded hop isn't an IP address.
    ///
    /// Returns [`Error::NoPublicAddress`] or [`Error::IO`] when only public addresses are wanted and
    /// the fallback to the server's own address fails.
    pub async fn resolve(
        &self,
        remote: IpAddr,
        headers: &HeaderMap,
        myip: Option<&str>,
    ) -> Result<IpAddr, Error> {
        if !self.is_trusted(remote) {
            return Ok(remote);
        }

        if let Some(declared) = myip.filter(|ip| !ip.trim().is_empty()) {
            let declared = parse_candidate(declared)?;
            if !self.public_only || is_public(declared) {
                return Ok(declared);
            }
            debug!("ignoring non-public myip {declared} from {remote}");
        }

        let chain = forwarded_chain(headers)?;
        let candidate = chain
            .iter()
            .rev()
            .copied()
            .filter(|ip| !self.is_trusted(*ip))
            .find(|ip| !self.public_only || is_public(*ip));

        match candidate {
            Some(ip) => Ok(ip),
            None if self.public_only => resolve_this(remote.is_ipv6()).await,
            None => Ok(chain.first().copied().unwrap_or(remote)),
        }
    }
}
