use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::{AuthError, ValidationError};
use crate::routing::Route;
use crate::session::SessionStore;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("A login is already in progress")]
    InFlight,
}

/// State behind the admin login page.
///
/// The last failure is kept as inline text until the next attempt; the submit
/// control should be disabled while [`is_submitting`](Self::is_submitting).
#[derive(Clone)]
pub struct LoginForm {
    session: SessionStore,
    submitting: Arc<AtomicBool>,
    error: Arc<Mutex<Option<String>>>,
}

/// Clears the in-flight flag even if the submit future is dropped.
struct Submitting<'a>(&'a AtomicBool);

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LoginForm {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            submitting: Arc::new(AtomicBool::new(false)),
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// The message to show under the form.
    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Where to send an admin who opens the login page while signed in.
    pub fn redirect(&self) -> Option<Route> {
        self.session
            .snapshot()
            .is_authenticated()
            .then_some(Route::AdminDashboard)
    }

    /// Logs in and returns the route to continue to.
    pub async fn submit(&self, email: &str, password: &str) -> Result<Route, LoginError> {
        let email = email.trim();
        for (field, value) in [("email", email), ("password", password)] {
            if value.trim().is_empty() {
                let err = ValidationError::MissingField {
                    field: field.to_string(),
                };
                self.show(Some(err.to_string()));
                return Err(err.into());
            }
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("login submitted twice");
            return Err(LoginError::InFlight);
        }
        let _submitting = Submitting(&self.submitting);
        self.show(None);

        match self.session.login(email, password).await {
            Ok(identity) => {
                info!(admin = ?identity.name, "login form accepted");
                Ok(Route::AdminDashboard)
            }
            Err(e) => {
                self.show(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn show(&self, message: Option<String>) {
        *self.error.lock().unwrap_or_else(|e| e.into_inner()) = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, Credentials};
    use crate::config::AppConfig;
    use crate::session::MemoryTokenStore;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form_for(server: &MockServer) -> LoginForm {
        let config = AppConfig {
            api_base: server.uri(),
            ..AppConfig::default()
        };
        let api = ApiClient::new(&config, Credentials::new()).unwrap();
        LoginForm::new(SessionStore::new(api, Arc::new(MemoryTokenStore::new())))
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let form = form_for(&server);
        let err = form.submit("  ", "x").await.unwrap_err();
        assert_eq!(
            err,
            LoginError::Validation(ValidationError::MissingField {
                field: "email".into()
            })
        );
        assert_eq!(form.error().as_deref(), Some("email is required"));
        assert!(form.submit("a@b.com", "").await.is_err());
    }

    #[tokio::test]
    async fn rejection_is_shown_inline_and_retry_clears_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t1"})))
            .mount(&server)
            .await;

        let form = form_for(&server);
        assert!(form.submit("a@b.com", "bad").await.is_err());
        assert_eq!(form.error().as_deref(), Some("Invalid credentials"));
        assert!(!form.is_submitting());
        assert!(form.redirect().is_none());

        assert_eq!(form.submit("a@b.com", "good").await, Ok(Route::AdminDashboard));
        assert!(form.error().is_none());
        assert_eq!(form.redirect(), Some(Route::AdminDashboard));
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "t1"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let form = form_for(&server);
        let first = form.submit("a@b.com", "x");
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(form.is_submitting());
            form.submit("a@b.com", "x").await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert_eq!(second, Err(LoginError::InFlight));
        assert!(!form.is_submitting());
    }
}
