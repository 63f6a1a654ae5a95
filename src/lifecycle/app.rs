use std::sync::Arc;

use tracing::{info, instrument};

use crate::admin::{Dashboard, LoginForm};
use crate::api::{ApiClient, ContactClient, Credentials};
use crate::config::AppConfig;
use crate::error::{ConfigError, RequestError};
use crate::loading::{LoadingCoordinator, ReadinessHandle};
use crate::model::Session;
use crate::routing::{GuardOutcome, Navigator, Route, RouteGuard};
use crate::session::{FileTokenStore, SessionStore, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] RequestError),
}

/// The result of following a path.
#[must_use]
pub struct Visit {
    /// Where the user ended up after any redirect.
    pub route: Route,
    pub outcome: GuardOutcome,
    /// Report readiness for `route` through this once its content is loaded.
    pub readiness: ReadinessHandle,
}

/// The composition root: every service, built once and wired explicitly.
///
/// # Architecture
///
/// - **Session**: [`SessionStore`] shares its [`Credentials`] with the
///   [`ApiClient`], so every request made through any clone of the client
///   carries the current bearer token.
/// - **Navigation**: [`Navigator`] feeds the [`LoadingCoordinator`];
///   [`RouteGuard`] reads the session.
/// - **Dashboard**: opened on demand; its managers share the client and use the
///   session for headers.
///
/// ```ignore
/// let app = PortfolioApp::new(load_config()?)?;
/// app.start().await;
/// let visit = app.visit("/admin/dashboard");
/// ```
pub struct PortfolioApp {
    pub config: AppConfig,
    pub api: ApiClient,
    pub session: SessionStore,
    pub loading: LoadingCoordinator,
    pub navigator: Navigator,
    pub contact: ContactClient,
    guard: RouteGuard,
}

impl PortfolioApp {
    /// Persists the admin token in the file named by `session.token_file`.
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        let tokens = FileTokenStore::new(&config.session.token_file, &config.session.token_key);
        Self::with_token_store(config, Arc::new(tokens))
    }

    pub fn with_token_store(
        config: AppConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, StartupError> {
        let api = ApiClient::new(&config, Credentials::new())?;
        let session = SessionStore::new(api.clone(), tokens);
        let loading = LoadingCoordinator::from_config(&config.loading);
        let navigator = Navigator::new(Route::Home, loading.clone());
        let contact = ContactClient::new(api.clone());
        let guard = RouteGuard::new(session.subscribe());

        info!(api_base = %config.api_base(), "Application wired");
        Ok(Self {
            config,
            api,
            session,
            loading,
            navigator,
            contact,
            guard,
        })
    }

    /// Runs the startup session check. Always resolves.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Session {
        let session = self.session.restore().await;
        info!(
            authenticated = session.is_authenticated(),
            admin = %session.display_name(),
            "Application started"
        );
        session
    }

    pub fn guard(&self) -> RouteGuard {
        self.guard.clone()
    }

    /// Navigates to `path` and applies the guard to the current session.
    ///
    /// A protected route seen before the session has resolved yields
    /// [`GuardOutcome::Placeholder`]; see [`visit_settled`](Self::visit_settled).
    pub fn visit(&self, path: &str) -> Visit {
        let route = Route::parse(path);
        let readiness = self.navigator.push(route.clone());
        let outcome = self.guard.check(&route);
        self.follow(route, outcome, readiness)
    }

    /// Like [`visit`](Self::visit), but waits for the session to resolve first.
    pub async fn visit_settled(&self, path: &str) -> Visit {
        let route = Route::parse(path);
        let readiness = self.navigator.push(route.clone());
        let outcome = self.guard().settle(&route).await;
        self.follow(route, outcome, readiness)
    }

    fn follow(&self, route: Route, outcome: GuardOutcome, readiness: ReadinessHandle) -> Visit {
        match outcome {
            GuardOutcome::Redirect { to, replace } => {
                info!(from = %route, to = %to, replace, "Guard redirect");
                let readiness = if replace {
                    self.navigator.replace(to.clone())
                } else {
                    self.navigator.push(to.clone())
                };
                Visit {
                    route: to.clone(),
                    outcome: GuardOutcome::Redirect { to, replace },
                    readiness,
                }
            }
            GuardOutcome::Placeholder | GuardOutcome::Render => Visit {
                route,
                outcome,
                readiness,
            },
        }
    }

    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(self.session.clone())
    }

    /// Starts the dashboard's section managers.
    pub fn open_dashboard(&self) -> Dashboard {
        Dashboard::open(self.api.clone(), self.session.clone(), self.config.status.duration())
    }
}
