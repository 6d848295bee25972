//! DynDNS2 return codes and the line oriented reply body.
//!
//! See <https://help.dyn.com/return-codes.html>.

use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// The update was successful.
    Good,
    /// Nothing had to change. Also the neutral starting value for every hostname.
    NoChange,
    /// No hostname was given.
    NotFqdn,
    /// A DNS backend failed.
    DnsError,
    /// No configured provider manages the hostname.
    NoHost,
    /// Authorization failed.
    BadAuth,
}

impl ReturnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnCode::Good => "good",
            ReturnCode::NoChange => "nochg",
            ReturnCode::NotFqdn => "notfqdn",
            ReturnCode::DnsError => "dnserr",
            ReturnCode::NoHost => "nohost",
            ReturnCode::BadAuth => "badauth",
        }
    }

    /// Only `good` and `nochg` lines echo the published address.
    fn carries_ip(self) -> bool {
        matches!(self, ReturnCode::Good | ReturnCode::NoChange)
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render one line per code, joined by `\n` without a trailing newline.
pub fn encode(ip: Option<IpAddr>, codes: &[ReturnCode]) -> String {
    codes
        .iter()
        .map(|code| match ip {
            Some(ip) if code.carries_ip() => format!("{code} {ip}"),
            _ => code.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encode the reply and log it alongside the hostnames it answers.
pub fn respond(ip: Option<IpAddr>, hosts: &[String], codes: &[ReturnCode]) -> String {
    let body = encode(ip, codes);
    if hosts.len() == codes.len() {
        let pairs: Vec<String> = hosts
            .iter()
            .zip(codes)
            .map(|(host, code)| format!("{host}={code}"))
            .collect();
        tracing::info!(ip = ?ip, results = ?pairs, "ddns update response");
    } else {
        tracing::info!(ip = ?ip, codes = ?codes, "ddns update response");
    }
    body
}
