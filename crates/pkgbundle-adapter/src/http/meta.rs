/*
[INPUT]:  No parameters
[OUTPUT]: Supported systems and service health
[POS]:    HTTP layer - informational endpoints
[UPDATE]: When the service adds informational endpoints
*/

use reqwest::Method;

use crate::http::{BundleClient, Result};
use crate::types::{HealthResponse, SystemsResponse};

impl BundleClient {
    /// Query supported distributions per system type
    ///
    /// GET /api/systems
    pub async fn list_systems(&self) -> Result<SystemsResponse> {
        let builder = self.request(Method::GET, &["api", "systems"])?;
        self.send_json(builder).await
    }

    /// Query service health
    ///
    /// GET /api/health
    pub async fn health(&self) -> Result<HealthResponse> {
        let builder = self.request(Method::GET, &["api", "health"])?;
        self.send_json(builder).await
    }
}
