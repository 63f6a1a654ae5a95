//! HTTP client for the portfolio REST API.
//!
//! [`ResourceApi`] is the seam the CRUD manager talks through; [`ApiClient`]
//! is its reqwest-backed implementation. Every request goes to
//! `{base}{endpoint}[/{id}]`, carries the shared bearer token when one is
//! set, and fails with [`RequestError`] on a transport error or any non-2xx
//! status.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::credentials::Credentials;
use crate::config::AppConfig;
use crate::error::RequestError;
use crate::model::Item;

/// Which record an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget<'a> {
    /// The section's only record; no id segment in the URL.
    Singleton,
    /// One record of a collection.
    Item(&'a str),
}

/// CRUD operations against one endpoint.
///
/// `headers` are caller-supplied extras (usually bearer auth) applied on top
/// of whatever the implementation attaches itself.
#[async_trait]
pub trait ResourceApi: Send + Sync + 'static {
    /// `GET {endpoint}`: a collection, or a single object for singletons.
    async fn list(&self, endpoint: &str, headers: Option<&HeaderMap>) -> Result<Value, RequestError>;

    /// `POST {endpoint}`.
    async fn create(
        &self,
        endpoint: &str,
        body: &Item,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError>;

    /// `PUT {endpoint}` or `PUT {endpoint}/{id}`.
    async fn update(
        &self,
        endpoint: &str,
        target: UpdateTarget<'_>,
        body: &Item,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError>;

    /// `DELETE {endpoint}/{id}`.
    async fn remove(
        &self,
        endpoint: &str,
        id: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<(), RequestError>;
}

/// reqwest-backed API client. Cheap to clone; clones share the connection
/// pool and the credentials.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(config: &AppConfig, credentials: Credentials) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RequestError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base().to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}{}/{}", self.base_url, endpoint, id),
            None => format!("{}{}", self.base_url, endpoint),
        }
    }

    /// `GET` returning the parsed JSON body.
    #[instrument(skip(self, headers))]
    pub async fn get_json(&self, endpoint: &str, headers: Option<&HeaderMap>) -> Result<Value, RequestError> {
        let request = self.http.get(self.url(endpoint, None));
        let response = self.send(Method::GET, endpoint, request, headers).await?;
        read_json(response).await
    }

    /// `POST` a JSON body, returning the parsed JSON reply.
    #[instrument(skip(self, body, headers))]
    pub async fn post_json<B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: &str,
        body: &B,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError> {
        let request = self.http.post(self.url(endpoint, None)).json(body);
        let response = self.send(Method::POST, endpoint, request, headers).await?;
        read_json(response).await
    }

    /// `POST` a JSON body, discarding whatever the server answers.
    #[instrument(skip(self, body, headers))]
    pub async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: &str,
        body: &B,
        headers: Option<&HeaderMap>,
    ) -> Result<(), RequestError> {
        let request = self.http.post(self.url(endpoint, None)).json(body);
        self.send(Method::POST, endpoint, request, headers).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        mut request: RequestBuilder,
        headers: Option<&HeaderMap>,
    ) -> Result<Response, RequestError> {
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        if let Some(extra) = headers {
            request = request.headers(extra.clone());
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, endpoint, error = %e, "request failed");
            RequestError::network(e)
        })?;

        let status = response.status();
        debug!(%method, endpoint, status = status.as_u16(), "response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RequestError::status(status.as_u16(), server_message(&body));
        warn!(%method, endpoint, status = status.as_u16(), error = %err, "request rejected");
        Err(err)
    }
}

#[async_trait]
impl ResourceApi for ApiClient {
    #[instrument(skip(self, headers))]
    async fn list(&self, endpoint: &str, headers: Option<&HeaderMap>) -> Result<Value, RequestError> {
        self.get_json(endpoint, headers).await
    }

    #[instrument(skip(self, body, headers))]
    async fn create(
        &self,
        endpoint: &str,
        body: &Item,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError> {
        debug!(?body, "create called");
        self.post_json(endpoint, body, headers).await
    }

    #[instrument(skip(self, body, headers))]
    async fn update(
        &self,
        endpoint: &str,
        target: UpdateTarget<'_>,
        body: &Item,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError> {
        debug!(?body, "update called");
        let id = match target {
            UpdateTarget::Singleton => None,
            UpdateTarget::Item(id) => Some(id),
        };
        let request = self.http.put(self.url(endpoint, id)).json(body);
        let response = self.send(Method::PUT, endpoint, request, headers).await?;
        read_json(response).await
    }

    #[instrument(skip(self, headers))]
    async fn remove(
        &self,
        endpoint: &str,
        id: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<(), RequestError> {
        let request = self.http.delete(self.url(endpoint, Some(id)));
        self.send(Method::DELETE, endpoint, request, headers).await?;
        Ok(())
    }
}

/// Empty bodies read as `null`.
async fn read_json(response: Response) -> Result<Value, RequestError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| RequestError::malformed(status, e))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| RequestError::malformed(status, e))
}

/// `{"message": ...}` or `{"error": ...}` from an error body.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key)?.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
