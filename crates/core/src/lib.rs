//! Core functionality for the SignalMesh signal-network engine.
//!
//! This crate provides the spatial types, configuration and logging
//! shared across the SignalMesh workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{Config, EngineConfig, LoggingConfig};
pub use error::{CoreError, Result};
pub use types::{Direction, DirectionSet, Position};
