//! Infrastructure layer.
//!
//! Configuration, composition and process lifecycle. No trading logic lives
//! here.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`runtime`] - Scan loop lifecycle and shutdown

pub mod bootstrap;
pub mod config;
pub mod runtime;
