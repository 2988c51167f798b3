//! Data models for the application
//!
//! Output configuration, job lifecycle, generated assets and the request/response
//! shapes of the generation API.

mod accessibility;
mod asset;
mod job;
mod output;
mod request;

// Re-export all models for convenient imports
pub use accessibility::*;
pub use asset::*;
pub use job::*;
pub use output::*;
pub use request::*;
