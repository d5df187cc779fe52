//! HTTP downloading and progress tracking.

pub mod http;
pub mod models;
pub mod progress;

pub use http::download_asset;
pub use models::{DownloadJob, Downloaded, JobStatus};
pub use progress::ProgressTracker;
