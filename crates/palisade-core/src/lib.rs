//! # Palisade Core
//!
//! Core types, traits, and error definitions for Palisade.
//! This crate provides the foundational abstractions shared by the
//! cache, resilience, remote, and config layers.

pub mod error;
pub mod result;
pub mod telemetry;
pub mod traits;

pub use error::*;
pub use result::*;
pub use telemetry::*;
pub use traits::*;
