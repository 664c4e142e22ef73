//! Core error types.

use thiserror::Error;

/// Why the SSRF guard refused a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardRejection {
    #[error("URL longer than {0} characters")]
    TooLong(usize),

    #[error("URL could not be parsed")]
    Unparsable,

    #[error("Scheme not allowed: {0}")]
    Scheme(String),

    #[error("URL carries credentials")]
    UserInfo,

    #[error("Host is an IP address")]
    IpLiteral,

    #[error("Host has no domain suffix: {0}")]
    NoDomainSuffix(String),

    #[error("Host starts with a digit: {0}")]
    LeadingDigit(String),

    #[error("Host is on the deny list: {0}")]
    BlockedHost(String),

    #[error("URL contains an encoded loopback address")]
    EncodedLoopback,

    #[error("Explicit port not allowed: {0}")]
    ExplicitPort(u16),

    #[error("URL is not a readable web address")]
    Shape,
}

/// Session and target resolution errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("URL rejected: {0}")]
    Rejected(#[from] GuardRejection),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
