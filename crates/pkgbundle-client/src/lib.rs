/*
[INPUT]:  Public API exports for the pkgbundle client crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod catalog;
pub mod config;
pub mod download;
pub mod machine;
pub mod package_set;
pub mod poller;
pub mod registry;
pub mod render;
pub mod session;
pub mod tracker;

// Re-export main types for convenience
pub use config::ClientSettings;
pub use machine::{Notice, NoticeLevel, SubmitError, SubmitForm, TrackerPhase, TrackerView};
pub use package_set::{AddOutcome, PackageInput, PackageSet};
pub use registry::{RegistrySnapshot, TaskRegistry};
pub use session::{Session, SessionUpdate};
pub use tracker::{TaskTracker, TrackerConfig, TrackerEvent};
