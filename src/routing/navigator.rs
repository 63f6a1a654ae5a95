use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::info;

use super::routes::Route;
use crate::loading::{LoadingCoordinator, ReadinessHandle};

/// In-memory browser history.
///
/// Every move notifies the [`LoadingCoordinator`] and hands back the
/// destination's [`ReadinessHandle`]. Cheap to clone; clones share history.
#[derive(Clone)]
pub struct Navigator {
    entries: Arc<Mutex<Vec<Route>>>,
    current: Arc<watch::Sender<Route>>,
    loading: LoadingCoordinator,
}

impl Navigator {
    /// Starts with `initial` as the only entry, without a navigation event.
    pub fn new(initial: Route, loading: LoadingCoordinator) -> Self {
        let (current, _) = watch::channel(initial.clone());
        Self {
            entries: Arc::new(Mutex::new(vec![initial])),
            current: Arc::new(current),
            loading,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Route>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, route: Route) -> ReadinessHandle {
        self.lock().push(route.clone());
        self.arrive(route, "push")
    }

    /// Swaps the current entry, so going back skips it.
    pub fn replace(&self, route: Route) -> ReadinessHandle {
        {
            let mut entries = self.lock();
            entries.pop();
            entries.push(route.clone());
        }
        self.arrive(route, "replace")
    }

    /// `None` when already at the first entry.
    pub fn back(&self) -> Option<ReadinessHandle> {
        let route = {
            let mut entries = self.lock();
            if entries.len() < 2 {
                return None;
            }
            entries.pop();
            entries.last().cloned()?
        };
        Some(self.arrive(route, "back"))
    }

    pub fn current(&self) -> Route {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    pub fn history(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn arrive(&self, route: Route, how: &'static str) -> ReadinessHandle {
        info!(%route, how, "Navigated");
        let handle = self.loading.navigate(route.readiness());
        self.current.send_replace(route);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn navigator() -> Navigator {
        let loading = LoadingCoordinator::new(Duration::from_millis(800), Duration::from_secs(5));
        Navigator::new(Route::Home, loading)
    }

    #[tokio::test(start_paused = true)]
    async fn push_and_back() {
        let nav = navigator();
        let _a = nav.push(Route::Projects);
        let _b = nav.push(Route::Skills);
        assert_eq!(nav.current(), Route::Skills);

        let _c = nav.back().unwrap();
        assert_eq!(nav.current(), Route::Projects);
        let _d = nav.back().unwrap();
        assert_eq!(nav.current(), Route::Home);
        assert!(nav.back().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn replace_leaves_no_back_entry() {
        let nav = navigator();
        let _a = nav.push(Route::AdminDashboard);
        let _b = nav.replace(Route::AdminLogin);

        assert_eq!(nav.history(), vec![Route::Home, Route::AdminLogin]);
        let _c = nav.back().unwrap();
        assert_eq!(nav.current(), Route::Home);
    }

    #[tokio::test(start_paused = true)]
    async fn every_move_raises_the_overlay() {
        let loading = LoadingCoordinator::new(Duration::from_millis(800), Duration::from_secs(5));
        let nav = Navigator::new(Route::Home, loading.clone());
        assert!(!loading.is_visible());

        let _handle = nav.push(Route::Contact);
        assert!(loading.is_visible());
        assert!(loading.signals().route_changed);
    }
}
