//! Per-job download state.

use std::path::PathBuf;

use crate::backend::sources::Asset;

/// Completed download: where the archive landed and how big it was.
#[derive(Debug)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// Lifecycle of one user-initiated download action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed(String),
}

/// Caller-owned state for one download action. Progress only moves
/// forward while the job runs; retrying means creating a new job.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub asset: Asset,
    pub target_root: PathBuf,
    pub progress: u8,
    pub status: JobStatus,
}

impl DownloadJob {
    pub fn new(asset: Asset, target_root: PathBuf) -> Self {
        Self {
            asset,
            target_root,
            progress: 0,
            status: JobStatus::Pending,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::InProgress;
    }

    /// Record a progress report; regressions are ignored.
    pub fn set_progress(&mut self, percent: u8) {
        if percent > self.progress {
            self.progress = percent;
        }
    }

    pub fn succeed(&mut self) {
        self.status = JobStatus::Succeeded;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> DownloadJob {
        DownloadJob::new(
            Asset {
                name: "game.zip".to_string(),
                download_url: "https://host/game.zip".to_string(),
                size_hint: None,
            },
            PathBuf::from("/tmp/games"),
        )
    }

    #[test]
    fn progress_never_regresses() {
        let mut job = job();
        job.start();
        job.set_progress(40);
        job.set_progress(10);
        assert_eq!(job.progress, 40);
        assert_eq!(job.status, JobStatus::InProgress);
    }

    #[test]
    fn failure_keeps_the_reason() {
        let mut job = job();
        job.fail("no space left");
        assert_eq!(job.status, JobStatus::Failed("no space left".to_string()));
    }
}
