//! Core services.

pub mod updater;

pub use updater::{UpdateEvent, spawn_download, spawn_release_poll};
