use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::warn;

/// The bearer token attached to outgoing requests.
///
/// One instance is shared between the [`ApiClient`](super::ApiClient) and the
/// [`SessionStore`](crate::session::SessionStore): whenever the session sets or
/// clears the token, every later request sees the change.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// `Authorization: Bearer <token>` when a token is set, an empty map otherwise.
    pub fn bearer_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "token is not a valid header value"),
            }
        }
        headers
    }
}

/// Supplies per-request headers, typically the admin's bearer credential.
pub trait HeaderSource: Send + Sync + 'static {
    fn headers(&self) -> HeaderMap;
}

impl HeaderSource for Credentials {
    fn headers(&self) -> HeaderMap {
        self.bearer_headers()
    }
}

/// No extra headers.
impl HeaderSource for () {
    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}
