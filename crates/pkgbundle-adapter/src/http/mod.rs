/*
[INPUT]:  HTTP client configuration and service endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod archive;
pub mod client;
pub mod error;
pub mod meta;
pub mod tasks;

pub use error::{BundleError, Result};

pub use client::{BundleClient, ClientConfig};
