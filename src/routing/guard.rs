//! Session-gated access to protected routes.

use tokio::sync::watch;
use tracing::debug;

use super::routes::Route;
use crate::model::Session;

/// Where the session stands, from the guard's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The startup check has not finished.
    Checking,
    Authenticated,
    Unauthenticated,
}

impl GuardState {
    pub fn of(session: &Session) -> Self {
        match (session.resolved, session.is_authenticated()) {
            (false, _) => GuardState::Checking,
            (true, true) => GuardState::Authenticated,
            (true, false) => GuardState::Unauthenticated,
        }
    }
}

/// What to do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show a neutral placeholder; neither content nor a redirect.
    Placeholder,
    /// Go somewhere else. `replace` keeps the blocked route out of history.
    Redirect { to: Route, replace: bool },
    Render,
}

/// Decides whether a route may render for the given session.
///
/// Protected routes wait for the session, then render or bounce to the login
/// page. The login page itself bounces an already authenticated admin to the
/// dashboard. Everything else renders.
pub fn decide(route: &Route, session: &Session) -> GuardOutcome {
    let state = GuardState::of(session);
    match route {
        r if r.is_protected() => match state {
            GuardState::Checking => GuardOutcome::Placeholder,
            GuardState::Authenticated => GuardOutcome::Render,
            GuardState::Unauthenticated => GuardOutcome::Redirect {
                to: Route::AdminLogin,
                replace: true,
            },
        },
        Route::AdminLogin if state == GuardState::Authenticated => GuardOutcome::Redirect {
            to: Route::AdminDashboard,
            replace: true,
        },
        _ => GuardOutcome::Render,
    }
}

/// Watches the session and answers [`decide`] for the latest state.
#[derive(Clone)]
pub struct RouteGuard {
    session: watch::Receiver<Session>,
}

impl RouteGuard {
    pub fn new(session: watch::Receiver<Session>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> GuardState {
        GuardState::of(&self.session.borrow())
    }

    pub fn check(&self, route: &Route) -> GuardOutcome {
        let outcome = decide(route, &self.session.borrow());
        debug!(%route, ?outcome, "Guard check");
        outcome
    }

    /// Waits for the session to resolve, then decides.
    pub async fn settle(&mut self, route: &Route) -> GuardOutcome {
        // Only fails if the session store is gone, in which case the last
        // known state is all there is.
        let _ = self.session.wait_for(|s| s.resolved).await;
        self.check(route)
    }

    /// Resolves once the [`GuardState`] differs from the one at the time of the
    /// call, e.g. after a logout.
    pub async fn changed(&mut self) -> GuardState {
        let before = self.state();
        let _ = self
            .session
            .wait_for(|s| GuardState::of(s) != before)
            .await;
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identity;

    fn authenticated() -> Session {
        Session::signed_in("t1", Identity::named("A"))
    }

    #[test]
    fn three_states_are_reachable_and_distinct() {
        let route = Route::AdminDashboard;
        let outcomes = [
            decide(&route, &Session::pending()),
            decide(&route, &Session::signed_out()),
            decide(&route, &authenticated()),
        ];
        assert_eq!(outcomes[0], GuardOutcome::Placeholder);
        assert_eq!(
            outcomes[1],
            GuardOutcome::Redirect {
                to: Route::AdminLogin,
                replace: true
            }
        );
        assert_eq!(outcomes[2], GuardOutcome::Render);
        assert_ne!(outcomes[0], outcomes[1]);
        assert_ne!(outcomes[1], outcomes[2]);
        assert_ne!(outcomes[0], outcomes[2]);
    }

    #[test]
    fn login_page_bounces_authenticated_admin() {
        assert_eq!(
            decide(&Route::AdminLogin, &authenticated()),
            GuardOutcome::Redirect {
                to: Route::AdminDashboard,
                replace: true
            }
        );
        assert_eq!(decide(&Route::AdminLogin, &Session::signed_out()), GuardOutcome::Render);
        assert_eq!(decide(&Route::AdminLogin, &Session::pending()), GuardOutcome::Render);
    }

    #[test]
    fn public_routes_always_render() {
        for session in [Session::pending(), Session::signed_out(), authenticated()] {
            assert_eq!(decide(&Route::Projects, &session), GuardOutcome::Render);
            assert_eq!(decide(&Route::NotFound("/x".into()), &session), GuardOutcome::Render);
        }
    }

    #[tokio::test]
    async fn settle_waits_for_resolution() {
        let (tx, rx) = watch::channel(Session::pending());
        let mut guard = RouteGuard::new(rx);
        assert_eq!(guard.state(), GuardState::Checking);

        let route = Route::AdminDashboard;
        let (outcome, _) = tokio::join!(guard.settle(&route), async {
            tx.send_replace(authenticated());
        });
        assert_eq!(outcome, GuardOutcome::Render);
    }

    #[tokio::test]
    async fn logout_is_observed_as_a_state_change() {
        let (tx, rx) = watch::channel(authenticated());
        let mut guard = RouteGuard::new(rx);

        let (state, _) = tokio::join!(guard.changed(), async {
            tx.send_replace(Session::signed_out());
        });
        assert_eq!(state, GuardState::Unauthenticated);
    }
}
