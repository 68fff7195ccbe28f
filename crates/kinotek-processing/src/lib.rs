//! Media probing for the kinotek catalog.
//!
//! The only processing this deployment does is duration estimation; actual
//! transcoding is simulated downstream. See [`DurationProbe`].

pub mod duration;

pub use duration::DurationProbe;
