//! Shared module - common types used across all features.

pub mod models;

pub use models::{Location, Span};
