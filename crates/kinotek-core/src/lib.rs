//! Core types for the kinotek media catalog: data models, configuration,
//! and the unified error type shared by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, AppResult};
