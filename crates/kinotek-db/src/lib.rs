//! Record store for the kinotek catalog.
//!
//! The [`VideoRepository`] trait is the narrow seam between the consistency
//! engine and whatever holds the records. Every update is a whole-record
//! upsert, which keeps mutations idempotent; the engine relies on that
//! instead of per-record locking.

pub mod video;

pub use video::{InMemoryVideoRepository, VideoRepository};
