//! # Loading Coordinator
//!
//! Folds three signals into the single "show the overlay" boolean:
//!
//! - `route_changed`: raised by every navigation, lowered when the minimum
//!   display timer fires.
//! - `minimum_elapsed`: the overlay has been up for at least `minimum`.
//! - `content_ready`: the destination said it has finished loading.
//!
//! The overlay is visible while `route_changed || !(minimum_elapsed && content_ready)`.
//! A navigation resets all three at once and restarts the timers, so a fast page
//! still shows the overlay for `minimum` and a slow page keeps it until it is
//! ready.
//!
//! Destinations that never report readiness are passed as
//! [`Readiness::Untracked`] and hide on the timer alone. A tracked destination
//! that forgets to signal is released after `max_wait`; dropping its
//! [`ReadinessHandle`] counts as signalling.
//!
//! Every navigation bumps a generation counter. Timer callbacks and readiness
//! handles carry the generation they were issued for and are ignored once a
//! newer navigation has happened.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::LoadingConfig;

/// Whether a destination will call [`ReadinessHandle::ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Tracked,
    Untracked,
}

/// Snapshot of the three inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingSignals {
    pub route_changed: bool,
    pub minimum_elapsed: bool,
    pub content_ready: bool,
}

impl LoadingSignals {
    fn idle() -> Self {
        Self {
            route_changed: false,
            minimum_elapsed: true,
            content_ready: true,
        }
    }

    pub fn overlay_visible(&self) -> bool {
        self.route_changed || !(self.minimum_elapsed && self.content_ready)
    }
}

struct State {
    signals: LoadingSignals,
    generation: u64,
    minimum_timer: Option<JoinHandle<()>>,
    fallback_timer: Option<JoinHandle<()>>,
}

impl State {
    fn cancel_timers(&mut self) {
        for timer in [self.minimum_timer.take(), self.fallback_timer.take()]
            .into_iter()
            .flatten()
        {
            timer.abort();
        }
    }
}

struct Inner {
    state: Mutex<State>,
    visible: watch::Sender<bool>,
    minimum: Duration,
    max_wait: Duration,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, generation: u64, apply: impl FnOnce(&mut LoadingSignals)) {
        let visible = {
            let mut state = self.lock();
            if state.generation != generation {
                debug!(generation, current = state.generation, "Ignoring stale loading signal");
                return;
            }
            apply(&mut state.signals);
            state.signals.overlay_visible()
        };
        self.publish(visible);
    }

    fn publish(&self, visible: bool) {
        let changed = self.visible.send_if_modified(|current| {
            let changed = *current != visible;
            *current = visible;
            changed
        });
        if changed {
            debug!(visible, "Loading overlay toggled");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.lock().cancel_timers();
    }
}

/// Drives the full-screen loading overlay. Cheap to clone; clones share state.
///
/// Timers run on the Tokio runtime, so [`navigate`](Self::navigate) must be
/// called from within one.
#[derive(Clone)]
pub struct LoadingCoordinator {
    inner: Arc<Inner>,
}

impl LoadingCoordinator {
    pub fn new(minimum: Duration, max_wait: Duration) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    signals: LoadingSignals::idle(),
                    generation: 0,
                    minimum_timer: None,
                    fallback_timer: None,
                }),
                visible,
                minimum,
                max_wait,
            }),
        }
    }

    pub fn from_config(config: &LoadingConfig) -> Self {
        Self::new(config.minimum(), config.max_wait())
    }

    /// Records a navigation and returns the handle the destination uses to
    /// report readiness.
    pub fn navigate(&self, readiness: Readiness) -> ReadinessHandle {
        let inner = &self.inner;
        let weak = Arc::downgrade(inner);

        let generation = {
            let mut state = inner.lock();
            state.cancel_timers();
            state.generation += 1;
            let generation = state.generation;
            state.signals = LoadingSignals {
                route_changed: true,
                minimum_elapsed: false,
                content_ready: readiness == Readiness::Untracked,
            };

            state.minimum_timer = Some(spawn_timer(weak.clone(), inner.minimum, move |inner| {
                inner.update(generation, |s| {
                    s.minimum_elapsed = true;
                    s.route_changed = false;
                });
            }));
            if readiness == Readiness::Tracked {
                state.fallback_timer = Some(spawn_timer(weak.clone(), inner.max_wait, move |inner| {
                    warn!(generation, "Destination never reported ready, releasing overlay");
                    inner.update(generation, |s| s.content_ready = true);
                }));
            }
            generation
        };
        debug!(generation, ?readiness, "Navigation started");
        inner.publish(true);

        ReadinessHandle {
            generation,
            inner: Some(weak),
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.inner.visible.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.visible.subscribe()
    }

    pub fn signals(&self) -> LoadingSignals {
        self.inner.lock().signals
    }

    /// Resolves once the overlay is hidden.
    pub async fn wait_hidden(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|visible| !*visible).await;
    }
}

fn spawn_timer(
    inner: Weak<Inner>,
    after: Duration,
    fire: impl FnOnce(&Inner) + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if let Some(inner) = inner.upgrade() {
            fire(&inner);
        }
    })
}

/// Issued to a destination by [`LoadingCoordinator::navigate`].
///
/// Call [`ready`](Self::ready) once the content is loaded. Dropping the
/// handle has the same effect.
#[must_use = "dropping the handle reports the destination as ready"]
pub struct ReadinessHandle {
    generation: u64,
    inner: Option<Weak<Inner>>,
}

impl ReadinessHandle {
    pub fn ready(mut self) {
        self.signal();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn signal(&mut self) {
        if let Some(inner) = self.inner.take().and_then(|w| w.upgrade()) {
            inner.update(self.generation, |s| s.content_ready = true);
        }
    }
}

impl Drop for ReadinessHandle {
    fn drop(&mut self) {
        self.signal();
    }
}
