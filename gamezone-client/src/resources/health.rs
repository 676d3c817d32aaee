use gamezone_core::{ApiResult, ApiTestReply, HealthStatus};

use crate::http::HttpClient;

/// Backend liveness endpoints.
#[derive(Debug, Clone)]
pub struct HealthClient {
    http: HttpClient,
}

impl HealthClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /api/health`.
    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.http.get_json("/api/health").await
    }

    /// `GET /api/test`, a plain echo used to check connectivity.
    pub async fn test(&self) -> ApiResult<ApiTestReply> {
        self.http.get_json("/api/test").await
    }
}
