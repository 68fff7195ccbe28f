//! HTTP surface for the kinotek media catalog.
//!
//! Routine request handling only: every route is a thin adapter over the
//! services in `kinotek-services`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
