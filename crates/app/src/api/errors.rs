//! Cart API errors.

use bazaar::money::MoneyConversionError;
use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,

        /// `message` from the error body, or the status reason
        message: String,
    },

    /// The response body carried an amount the client cannot represent.
    #[error("invalid amount in response")]
    InvalidAmount(#[from] MoneyConversionError),

    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint url")]
    Url(#[from] url::ParseError),

    /// The configured session cookie is not a valid header value.
    #[error("session cookie is not a valid header value")]
    InvalidSessionCookie,
}

impl ApiError {
    /// Whether the server itself refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}
