//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); events carry
//! structured fields such as `section`, `id`, `status` and `generation`
//! instead.
//!
//! ```bash
//! RUST_LOG=info cargo run     # session, navigation and CRUD outcomes
//! RUST_LOG=debug cargo run    # request bodies, guard decisions, overlay toggles
//! RUST_LOG=portfolio_admin::crud=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a dashboard edit looks like:
//!
//! ```text
//! INFO login{email="a@b.com"}: logged in admin=Some("A")
//! INFO Navigated route=/admin/dashboard how="replace"
//! INFO Tab selected section=skills
//! INFO Loaded section="skills" count=4
//! INFO Saved section="skills" id=Some("65f1")
//! INFO Loaded section="skills" count=4
//! ```

/// Installs the global subscriber. Safe to call more than once; later calls
/// are no-ops, so tests can call it freely.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
