//! Generation job lifecycle for promogen.
//!
//! [`UploadSession`] turns a source image into a job id, [`JobController`] submits
//! and polls a generation run for it, [`AssetStore`] holds the completed batch and
//! [`Materializer`] writes it out.

pub mod controller;
pub mod materializer;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use controller::{JobController, JobPhase, JobSnapshot, PollHandle};
pub use materializer::{AssetSink, DirectorySink, Materializer, SaveReport};
pub use session::UploadSession;
pub use store::AssetStore;
