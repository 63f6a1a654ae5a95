//! # Mock API
//!
//! An in-process [`ResourceApi`] for testing the CRUD manager without a server.
//!
//! Queue expectations in the order the code under test will make the calls,
//! run the code, then call [`MockApi::verify`]. Every call is also recorded in
//! a log so tests can assert on what was (or was not) sent.
//!
//! ```ignore
//! let mock = MockApi::new();
//! mock.expect_list("/api/skills").return_ok(json!([]));
//! mock.expect_create("/api/skills").return_ok(json!({"_id": "1"}));
//!
//! // hand `mock.clone()` to the code under test...
//! mock.verify();
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde_json::Value;

use super::client::{ResourceApi, UpdateTarget};
use crate::error::RequestError;
use crate::model::Item;

/// One call as the mock saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List { endpoint: String },
    Create { endpoint: String, body: Item },
    Update { endpoint: String, id: Option<String>, body: Item },
    Remove { endpoint: String, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    List,
    Create,
    Update,
    Remove,
}

struct Expectation {
    op: Op,
    endpoint: String,
    id: Option<String>,
    response: Result<Value, RequestError>,
}

#[derive(Default)]
struct State {
    expectations: VecDeque<Expectation>,
    calls: Vec<ApiCall>,
    authorization: Vec<Option<String>>,
}

/// A mock API with expectation tracking for fluent testing.
///
/// Clones share the same expectation queue and call log.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Expects a `list` on `endpoint`.
    pub fn expect_list(&self, endpoint: &str) -> ExpectationBuilder {
        self.builder(Op::List, endpoint, None)
    }

    /// Expects a `create` on `endpoint`.
    pub fn expect_create(&self, endpoint: &str) -> ExpectationBuilder {
        self.builder(Op::Create, endpoint, None)
    }

    /// Expects an `update` of `id` (or of the singleton when `None`).
    pub fn expect_update(&self, endpoint: &str, id: Option<&str>) -> ExpectationBuilder {
        self.builder(Op::Update, endpoint, id)
    }

    /// Expects a `remove` of `id`.
    pub fn expect_remove(&self, endpoint: &str, id: &str) -> ExpectationBuilder {
        self.builder(Op::Remove, endpoint, Some(id))
    }

    fn builder(&self, op: Op, endpoint: &str, id: Option<&str>) -> ExpectationBuilder {
        ExpectationBuilder {
            op,
            endpoint: endpoint.to_string(),
            id: id.map(str::to_string),
            state: self.state.clone(),
        }
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// The `Authorization` header of every call, oldest first.
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.lock().authorization.clone()
    }

    /// Panics unless every queued expectation was consumed.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    fn answer(
        &self,
        call: ApiCall,
        op: Op,
        endpoint: &str,
        id: Option<&str>,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError> {
        let mut state = self.lock();
        state.calls.push(call.clone());
        state.authorization.push(
            headers
                .and_then(|h| h.get(AUTHORIZATION))
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );

        let Some(expectation) = state.expectations.pop_front() else {
            drop(state);
            panic!("Unexpected call with no expectation queued: {call:?}");
        };
        if expectation.op != op || expectation.endpoint != endpoint || expectation.id.as_deref() != id {
            drop(state);
            panic!(
                "Expectation mismatch: expected {:?} {} {:?}, got {call:?}",
                expectation.op, expectation.endpoint, expectation.id
            );
        }
        expectation.response
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder {
    op: Op,
    endpoint: String,
    id: Option<String>,
    state: Arc<Mutex<State>>,
}

impl ExpectationBuilder {
    /// Sets the expectation to return a successful body.
    pub fn return_ok(self, body: Value) {
        self.push(Ok(body));
    }

    /// Sets the expectation to fail.
    pub fn return_err(self, error: RequestError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Value, RequestError>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.expectations.push_back(Expectation {
            op: self.op,
            endpoint: self.endpoint,
            id: self.id,
            response,
        });
    }
}

#[async_trait]
impl ResourceApi for MockApi {
    async fn list(&self, endpoint: &str, headers: Option<&HeaderMap>) -> Result<Value, RequestError> {
        let call = ApiCall::List {
            endpoint: endpoint.to_string(),
        };
        self.answer(call, Op::List, endpoint, None, headers)
    }

    async fn create(
        &self,
        endpoint: &str,
        body: &Item,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError> {
        let call = ApiCall::Create {
            endpoint: endpoint.to_string(),
            body: body.clone(),
        };
        self.answer(call, Op::Create, endpoint, None, headers)
    }

    async fn update(
        &self,
        endpoint: &str,
        target: UpdateTarget<'_>,
        body: &Item,
        headers: Option<&HeaderMap>,
    ) -> Result<Value, RequestError> {
        let id = match target {
            UpdateTarget::Singleton => None,
            UpdateTarget::Item(id) => Some(id),
        };
        let call = ApiCall::Update {
            endpoint: endpoint.to_string(),
            id: id.map(str::to_string),
            body: body.clone(),
        };
        self.answer(call, Op::Update, endpoint, id, headers)
    }

    async fn remove(
        &self,
        endpoint: &str,
        id: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<(), RequestError> {
        let call = ApiCall::Remove {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        };
        self.answer(call, Op::Remove, endpoint, Some(id), headers)
            .map(|_| ())
    }
}
