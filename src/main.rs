//! # Portfolio Admin demo
//!
//! Walks the admin flow against a running API:
//!
//! 1. Restores the persisted session.
//! 2. Opens `/admin/dashboard`; the guard sends a signed-out admin to the login
//!    page, where `PORTFOLIO_ADMIN_EMAIL` / `PORTFOLIO_ADMIN_PASSWORD` are used.
//! 3. Loads every dashboard tab and prints what it found.

use portfolio_admin::config::load_config;
use portfolio_admin::lifecycle::{setup_tracing, PortfolioApp};
use portfolio_admin::routing::{GuardOutcome, Route};
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = load_config().map_err(|e| e.to_string())?;
    let app = PortfolioApp::new(config).map_err(|e| e.to_string())?;
    app.start().await;

    let visit = app.visit_settled("/admin/dashboard").await;
    if visit.route == Route::AdminLogin {
        let (Ok(email), Ok(password)) = (
            std::env::var("PORTFOLIO_ADMIN_EMAIL"),
            std::env::var("PORTFOLIO_ADMIN_PASSWORD"),
        ) else {
            warn!("Not signed in; set PORTFOLIO_ADMIN_EMAIL and PORTFOLIO_ADMIN_PASSWORD");
            return Ok(());
        };

        let form = app.login_form();
        let span = tracing::info_span!("login_page");
        let next = async { form.submit(&email, &password).await }
            .instrument(span)
            .await;
        match next {
            Ok(route) => {
                let _visit = app.visit(route.path());
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                return Err(e.to_string());
            }
        }
    }
    drop(visit);

    if app.guard().check(&Route::AdminDashboard) != GuardOutcome::Render {
        return Err("dashboard is not reachable".to_string());
    }

    let mut dashboard = app.open_dashboard();
    info!(admin = %dashboard.admin_name(), "Dashboard ready");

    let span = tracing::info_span!("dashboard_tour");
    async {
        for index in 0..dashboard.labels().len() {
            match dashboard.select(index).await {
                Ok(tab) => {
                    let view = tab.view();
                    info!(section = %tab.section().label, items = view.items.len(), "Tab loaded");
                    if let Some(status) = tab.status() {
                        warn!(section = %tab.section().label, status = %status.text, "Tab reported");
                    }
                }
                Err(e) => error!(index, error = %e, "Tab failed"),
            }
        }
    }
    .instrument(span)
    .await;

    dashboard.shutdown().await;
    app.loading.wait_hidden().await;
    info!("Demo completed");
    Ok(())
}
