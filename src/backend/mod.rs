//! Backend of the application.

/// HTTP downloading and progress tracking.
pub mod downloader;
/// Error taxonomy for poll, download, and install failures.
pub mod error;
/// Install materialization.
pub mod installer;
/// Shared HTTP client policy.
pub mod net;
/// Directory-backed registry of installed versions.
pub mod registry;
/// Background worker orchestration.
pub mod services;
/// Release sources.
pub mod sources;
/// Configuration and path utilities.
pub mod utils;
