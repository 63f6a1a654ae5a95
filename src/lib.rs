//! # Portfolio Admin
//!
//! > **The admin core of a personal portfolio site, without the UI.**
//!
//! A portfolio's admin dashboard edits content sections (projects, skills,
//! education, experience, certifications and the profile) through a REST API.
//! This crate holds everything the dashboard needs except rendering: the admin
//! session, a typed resource client, a generic CRUD manager, the route guard and
//! the loading-overlay coordinator.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Explicit services, no globals
//! Every service is built once in [`PortfolioApp`](lifecycle::PortfolioApp) and
//! handed to whoever needs it. Tests build exactly the pieces they exercise.
//!
//! ### The server is the source of truth
//! The CRUD manager never patches its list locally. Every successful save or
//! delete is followed by a fresh load.
//!
//! ### Sections as data
//! A section is a [`Section`](section::Section) descriptor: an endpoint, a
//! tagged [`SectionShape`](section::SectionShape) (collection or singleton) and
//! an [`Editor`](section::Editor). One manager implementation serves all six.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. One actor per section
//! Each [`SectionActor`](crud::SectionActor) runs in its own Tokio task and
//! handles requests one at a time, so a double submit can never race two
//! mutations against the server. Callers talk to it through a cloneable
//! [`SectionHandle`](crud::SectionHandle) and read state from `watch` channels.
//!
//! ### 2. Late-bound headers
//! Managers receive a [`HeaderSource`](api::HeaderSource) in `run()`, not in
//! `new()`. The dashboard passes the [`SessionStore`](session::SessionStore), so
//! login and logout take effect on the very next request.
//!
//! ### 3. Type-safe errors
//! [`RequestError`](error::RequestError), [`AuthError`](error::AuthError) and
//! [`ValidationError`](error::ValidationError) keep transport, session and form
//! failures apart. Nothing here is fatal: failed loads degrade to an empty list
//! plus a status message.
//!
//! ### 4. Observability
//! `tracing` everywhere, with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! - [`config`]: layered configuration (defaults, TOML file, `PORTFOLIO_*` env).
//! - [`error`]: the error taxonomy.
//! - [`model`]: session, item, status and contact data.
//! - [`api`]: the reqwest client, shared bearer credentials, contact client and
//!   [`MockApi`](api::mock::MockApi) for tests.
//! - [`session`]: login, logout, startup restore and token persistence.
//! - [`section`]: the section registry and declarative editor schemas.
//! - [`crud`]: the section manager actor, its handle and the status board.
//! - [`routing`]: routes, history and the route guard.
//! - [`loading`]: the loading-overlay coordinator.
//! - [`admin`]: the login form and dashboard.
//! - [`lifecycle`]: the composition root and tracing setup.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! PORTFOLIO_API_BASE=http://localhost:5000 RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod admin;
pub mod api;
pub mod config;
pub mod crud;
pub mod error;
pub mod lifecycle;
pub mod loading;
pub mod model;
pub mod routing;
pub mod section;
pub mod session;
