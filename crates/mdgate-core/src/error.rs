//! Shared error type across mdgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input (ticker, query parameter).
    BadRequest,
    /// Symbol unknown to the provider, or no data for it.
    NotFound,
    /// Provider failed or answered with something unusable.
    UpstreamError,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::UpstreamError => "UPSTREAM_ERROR",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MdGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum MdGateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
    #[error("no data found for ticker {0}")]
    NoData(String),
    #[error("provider error: {0}")]
    Upstream(String),
    #[error("provider response decode failed: {0}")]
    Decode(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MdGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MdGateError::BadRequest(_) => ClientCode::BadRequest,
            MdGateError::SymbolNotFound(_) | MdGateError::NoData(_) => ClientCode::NotFound,
            MdGateError::Upstream(_) | MdGateError::Decode(_) => ClientCode::UpstreamError,
            MdGateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            MdGateError::Config(_) | MdGateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Failure-kind label, one per variant. Used as the `error_type` metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            MdGateError::BadRequest(_) => "bad_request",
            MdGateError::SymbolNotFound(_) => "symbol_not_found",
            MdGateError::NoData(_) => "no_data",
            MdGateError::Upstream(_) => "upstream",
            MdGateError::Decode(_) => "decode",
            MdGateError::UnsupportedVersion => "unsupported_version",
            MdGateError::Config(_) => "config",
            MdGateError::Internal(_) => "internal",
        }
    }

    /// True when the provider simply has nothing for the symbol.
    pub fn is_not_found(&self) -> bool {
        matches!(self.client_code(), ClientCode::NotFound)
    }
}
