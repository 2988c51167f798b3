//! Promogen Core Library
//!
//! Domain models, the output spec registry, error taxonomy, configuration and
//! validation shared by the API client, the job controller and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod registry;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, JobTimings};
pub use error::{ErrorMetadata, GenerationError, LogLevel, RegistryError};
pub use registry::{OutputSpecRegistry, SpecField};
