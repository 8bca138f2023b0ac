//! # Palisade Remote
//!
//! Outbound dependency plumbing: classification of HTTP outcomes into
//! transient and permanent failures, and a client that runs every
//! request through a composed resilience policy.

mod classify;
mod client;

pub use classify::{classify_error, classify_status};
pub use client::DependencyClient;
