use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, DecodeError, Engine};
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::debug;

/// Basic-auth credentials taken from a request's `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

#[derive(thiserror::Error, Debug)]
pub enum CredentialsError {
    #[error("no authorization header")]
    Missing,
    #[error("authorization scheme is not Basic")]
    UnsupportedScheme,
    #[error("invalid encoding: {0}")]
    InvalidEncoding(DecodeError),
    #[error("credentials are not valid UTF-8")]
    InvalidUtf8,
    #[error("credentials lack a ':' separator")]
    MissingSeparator,
}

lazy_static! {
    // Clients disagree on whether to pad.
    static ref BASE64_ENGINE: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
    );
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, CredentialsError> {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(CredentialsError::Missing)?;
        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or(CredentialsError::UnsupportedScheme)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(CredentialsError::UnsupportedScheme);
        }
        let raw = BASE64_ENGINE
            .decode(encoded.trim())
            .map_err(CredentialsError::InvalidEncoding)?;
        let decoded = String::from_utf8(raw).map_err(|_| CredentialsError::InvalidUtf8)?;
        let (user, password) = decoded
            .split_once(':')
            .ok_or(CredentialsError::MissingSeparator)?;
        Ok(Credentials {
            user: user.to_string(),
            password: password.to_string(),
        })
    }
}

/// Check a request against the configured `users`. Every request passes when there are none.
pub fn authorize(users: &HashMap<String, String>, headers: &HeaderMap) -> bool {
    if users.is_empty() {
        debug!("authorisation ok, no user configured");
        return true;
    }

    let credentials = match Credentials::from_headers(headers) {
        Ok(credentials) => credentials,
        Err(err) => {
            debug!("authorisation failed: {err}");
            return false;
        }
    };

    match users.get(&credentials.user) {
        Some(password) if *password == credentials.password => {
            debug!("authorisation ok");
            true
        }
        _ => {
            debug!("authorisation failed, user not exists or password invalid");
            false
        }
    }
}
