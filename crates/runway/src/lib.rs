//! Runway generation API client.
//!
//! Provides the typed REST wrapper ([`api::RunwayApi`]), the
//! [`provider::GenerationProvider`] seam used by the HTTP handlers, and
//! [`provider::wait_for_output`], which drives the shared poll loop
//! against the task-status endpoint.

pub mod api;
pub mod provider;

pub use api::{
    CreatedTask, ImageToVideoRequest, RunwayApi, RunwayApiError, RunwayConfig, TaskRecord,
    TextToImageRequest,
};
pub use provider::{wait_for_output, GenerationProvider};
