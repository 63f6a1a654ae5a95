use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, instrument, warn};

use super::persist::TokenStore;
use crate::api::{ApiClient, HeaderSource};
use crate::error::AuthError;
use crate::model::{Identity, Session};

pub const ME_ENDPOINT: &str = "/api/admin/me";
pub const LOGIN_ENDPOINT: &str = "/api/admin/login";

/// Single source of truth for "is there an authenticated admin".
///
/// Cheap to clone; clones share state. Changes are broadcast on a
/// [`watch`] channel so guards and views can react to login and logout.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
    restored: OnceCell<()>,
    /// Bumped by every login and logout. The startup check only commits if it
    /// is unchanged, so a stale token can never undo a newer session.
    epoch: Mutex<u64>,
}

impl SessionStore {
    /// The store shares the client's credentials, so every request made through
    /// `api` (or any of its clones) carries whatever token the session holds.
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(Session::pending());
        Self {
            inner: Arc::new(Inner {
                api,
                tokens,
                state,
                restored: OnceCell::new(),
                epoch: Mutex::new(0),
            }),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Checks the persisted token against the server, once per store.
    ///
    /// Always ends with `resolved = true`: a missing token, a network error, a
    /// 401/403 or an unreadable reply all resolve to signed out (and discard the
    /// token). Later calls return the current state without another request.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Session {
        self.inner
            .restored
            .get_or_init(|| self.resolve_persisted())
            .await;
        self.snapshot()
    }

    async fn resolve_persisted(&self) {
        let (started, token) = {
            let epoch = self.epoch();
            let token = self.inner.tokens.load();
            match &token {
                Some(token) => self.inner.api.credentials().set(token.clone()),
                None => {
                    debug!("no persisted admin token");
                    self.publish(Session::signed_out());
                }
            }
            (*epoch, token)
        };
        let Some(token) = token else {
            return;
        };

        let checked = self
            .inner
            .api
            .get_json(ME_ENDPOINT, None)
            .await
            .map_err(|e| {
                warn!(error = %e, status = ?e.status, "session check failed");
                AuthError::InvalidSession
            })
            .and_then(|body| identity_from_me(&body));

        let epoch = self.epoch();
        if *epoch != started {
            debug!("session changed during the startup check; dropping its result");
            return;
        }
        match checked {
            Ok(identity) => {
                info!(admin = ?identity.name, "session restored");
                self.publish(Session::signed_in(token, identity));
            }
            Err(e) => {
                warn!(error = %e, "discarding persisted token");
                self.forget_token();
                self.publish(Session::signed_out());
            }
        }
    }

    /// Exchanges credentials for a token.
    ///
    /// A reply without a token is a failure, never a partial success. The
    /// error text is the server's reason or a generic fallback.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let body = json!({ "email": email, "password": password });
        let reply = self
            .inner
            .api
            .post_json(LOGIN_ENDPOINT, &body, None)
            .await
            .map_err(|e| {
                warn!(error = %e, status = ?e.status, "login rejected");
                AuthError::rejected(&e)
            })?;

        let Some(token) = reply
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
        else {
            warn!("login reply carried no token");
            return Err(AuthError::MissingToken);
        };
        let identity = reply
            .get("admin")
            .map(identity_in)
            .unwrap_or_default();

        let mut epoch = self.epoch();
        *epoch += 1;
        if let Err(e) = self.inner.tokens.save(&token) {
            warn!(error = %e, "could not persist admin token");
        }
        self.inner.api.credentials().set(token.clone());
        // A fresh login settles the session; a later restore() must not redo it.
        let _ = self.inner.restored.set(());
        self.publish(Session::signed_in(token, identity.clone()));
        info!(admin = ?identity.name, "logged in");
        Ok(identity)
    }

    /// Clears the session locally. No server round-trip.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        let mut epoch = self.epoch();
        *epoch += 1;
        self.forget_token();
        let _ = self.inner.restored.set(());
        self.publish(Session::signed_out());
        info!("logged out");
    }

    fn forget_token(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            warn!(error = %e, "could not remove persisted admin token");
        }
        self.inner.api.credentials().clear();
    }

    fn epoch(&self) -> MutexGuard<'_, u64> {
        self.inner.epoch.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, session: Session) {
        self.inner.state.send_replace(session);
    }
}

impl HeaderSource for SessionStore {
    fn headers(&self) -> HeaderMap {
        self.inner.api.credentials().bearer_headers()
    }
}

/// The `me` endpoint may answer `{ name, email }`, `{ admin: { .. } }` or just
/// `{ ok: true }`. Anything that is not a JSON object is malformed.
fn identity_from_me(body: &Value) -> Result<Identity, AuthError> {
    let Value::Object(map) = body else {
        return Err(AuthError::InvalidSession);
    };
    Ok(match map.get("admin") {
        Some(admin @ Value::Object(_)) => identity_in(admin),
        _ => identity_in(body),
    })
}

/// Reads whatever string `name` / `email` the value carries. A bare string is
/// taken as the name; anything else is an anonymous admin.
fn identity_in(value: &Value) -> Identity {
    if let Value::String(name) = value {
        return Identity::named(name.as_str());
    }
    let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    Identity {
        name: field("name"),
        email: field("email"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::Credentials;
    use crate::config::AppConfig;
    use crate::session::MemoryTokenStore;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer, tokens: MemoryTokenStore) -> SessionStore {
        let config = AppConfig {
            api_base: server.uri(),
            ..AppConfig::default()
        };
        let api = ApiClient::new(&config, Credentials::new()).unwrap();
        SessionStore::new(api, Arc::new(tokens))
    }

    #[tokio::test]
    async fn login_stores_token_and_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "x"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": "t1", "admin": {"name": "A"}})),
            )
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::new();
        let store = store_for(&server, tokens.clone());
        let identity = store.login("a@b.com", "x").await.unwrap();

        assert_eq!(identity, Identity::named("A"));
        let session = store.snapshot();
        assert!(session.resolved);
        assert_eq!(session.token(), Some("t1"));
        assert_eq!(session.identity(), Some(&Identity::named("A")));
        assert_eq!(tokens.load().as_deref(), Some("t1"));
        assert_eq!(store.headers()["authorization"], "Bearer t1");
    }

    #[tokio::test]
    async fn login_without_token_fails_and_stays_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"admin": {"name": "A"}})))
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::new();
        let store = store_for(&server, tokens.clone());
        let err = store.login("a@b.com", "x").await.unwrap_err();

        assert_eq!(err, AuthError::MissingToken);
        assert!(!store.snapshot().is_authenticated());
        assert_eq!(tokens.load(), None);
        assert!(store.headers().is_empty());
    }

    #[tokio::test]
    async fn login_tolerates_odd_admin_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t1", "admin": "A"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": "t2", "admin": {"name": 5}})),
            )
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::new();
        let store = store_for(&server, tokens.clone());

        assert_eq!(store.login("a@b.com", "x").await.unwrap(), Identity::named("A"));
        assert_eq!(store.login("a@b.com", "x").await.unwrap(), Identity::default());
        assert_eq!(store.snapshot().token(), Some("t2"));
        assert_eq!(tokens.load().as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn login_surfaces_server_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
            .mount(&server)
            .await;

        let store = store_for(&server, MemoryTokenStore::new());
        let err = store.login("a@b.com", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn restore_without_token_resolves_signed_out() {
        let server = MockServer::start().await;
        let store = store_for(&server, MemoryTokenStore::new());

        assert!(!store.snapshot().resolved);
        let session = store.restore().await;
        assert_eq!(session, Session::signed_out());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restore_validates_persisted_token_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/me"))
            .and(header("authorization", "Bearer saved"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, MemoryTokenStore::with_token("saved"));
        let session = store.restore().await;
        assert_eq!(session, Session::signed_in("saved", Identity::default()));

        // Second call is a no-op.
        assert_eq!(store.restore().await, session);
    }

    #[tokio::test]
    async fn restore_discards_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::with_token("stale");
        let store = store_for(&server, tokens.clone());
        let session = store.restore().await;

        assert_eq!(session, Session::signed_out());
        assert_eq!(tokens.load(), None);
        assert!(store.headers().is_empty());
    }

    #[tokio::test]
    async fn login_during_startup_check_outlives_stale_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/me"))
            .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": "fresh", "admin": {"name": "A"}})),
            )
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::with_token("stale");
        let store = store_for(&server, tokens.clone());
        let restoring = tokio::spawn({
            let store = store.clone();
            async move { store.restore().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!store.snapshot().resolved);

        store.login("a@b.com", "x").await.unwrap();
        let session = restoring.await.unwrap();

        assert_eq!(session, Session::signed_in("fresh", Identity::named("A")));
        assert_eq!(store.snapshot(), session);
        assert_eq!(tokens.load().as_deref(), Some("fresh"));
        assert_eq!(store.headers()["authorization"], "Bearer fresh");
    }

    #[tokio::test]
    async fn logout_during_startup_check_stays_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "A"}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::with_token("saved");
        let store = store_for(&server, tokens.clone());
        let restoring = tokio::spawn({
            let store = store.clone();
            async move { store.restore().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        store.logout();
        assert_eq!(restoring.await.unwrap(), Session::signed_out());
        assert_eq!(tokens.load(), None);
        assert!(store.headers().is_empty());
    }

    #[tokio::test]
    async fn restore_treats_malformed_reply_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])))
            .mount(&server)
            .await;

        let store = store_for(&server, MemoryTokenStore::with_token("t"));
        assert_eq!(store.restore().await, Session::signed_out());
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"admin": {"name": "A", "email": "a@b.com"}})))
            .mount(&server)
            .await;

        let tokens = MemoryTokenStore::with_token("t");
        let store = store_for(&server, tokens.clone());
        let mut changes = store.subscribe();
        let restored = store.restore().await;
        assert_eq!(restored.identity().unwrap().email.as_deref(), Some("a@b.com"));

        store.logout();
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), Session::signed_out());
        assert_eq!(tokens.load(), None);
        assert!(store.headers().is_empty());
    }

    #[test]
    fn identity_from_me_shapes() {
        assert_eq!(
            identity_from_me(&json!({"name": "A"})).unwrap(),
            Identity::named("A")
        );
        assert_eq!(
            identity_from_me(&json!({"admin": {"name": "B"}})).unwrap(),
            Identity::named("B")
        );
        assert_eq!(identity_from_me(&Value::Null), Err(AuthError::InvalidSession));
    }
}
