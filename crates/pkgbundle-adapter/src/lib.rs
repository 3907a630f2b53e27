/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public pkgbundle adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod service;
pub mod types;

// Re-export commonly used types from http
pub use http::{BundleClient, BundleError, ClientConfig, Result};

pub use service::TaskService;

// Re-export all types
pub use types::*;
