//! File storage for uploaded media.
//!
//! Uploaded bytes land on the local filesystem under a kind-specific base
//! directory and a collision-free generated name. Callers only ever see the
//! public `/{segment}/{name}` path; the filesystem layout stays internal.

pub mod local;

pub use local::{MediaStore, StorageError, StorageResult};
