//! # Simulation Error Types
//!
//! All errors that can occur while loading or building a simulation.

use std::path::PathBuf;

use steer_core::EcsError;
use thiserror::Error;

/// Errors that can occur in the simulation layer.
#[derive(Error, Debug)]
pub enum SteerError {
    /// A scene operation failed while populating the world.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for simulation operations.
pub type SteerResult<T> = Result<T, SteerError>;
