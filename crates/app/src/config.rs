//! Storefront API configuration.

use std::{fmt, time::Duration};

use url::Url;
use zeroize::Zeroizing;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for connecting to the storefront API.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the storefront backend, e.g. `"http://localhost:5000/"`.
    ///
    /// Endpoint paths are joined onto it, so it should end in `/`.
    pub base_url: Url,

    /// Session cookie to seed the cookie store with, e.g. `"accessToken=..."`.
    pub session_cookie: Option<Zeroizing<String>>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration for `base_url` with no session and the default timeout.
    ///
    /// A trailing `/` is added to the path if missing.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            session_cookie: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the session cookie.
    #[must_use]
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(Zeroizing::new(cookie.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Append `/` to the path so relative joins keep its last segment.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    url
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}
