//! # Canopy Core
//!
//! Core types and error definitions for the Canopy cache layer.
//! This crate provides the error vocabulary and result alias used by
//! every other crate in the workspace, plus the tracing bootstrap.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::*;
