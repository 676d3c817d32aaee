use gamezone_core::{AdminStats, ApiResult, MemberId, UserDashboard};

use super::id_path;
use crate::http::HttpClient;

/// Dashboard payloads for members and admins.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: HttpClient,
}

impl DashboardClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /dashboard/user/:id`.
    pub async fn user(&self, member_id: &MemberId) -> ApiResult<UserDashboard> {
        self.http
            .get_json(&id_path("/dashboard/user", member_id.as_str())?)
            .await
    }

    /// `GET /dashboard/admin/stats`.
    pub async fn admin_stats(&self) -> ApiResult<AdminStats> {
        self.http.get_json("/dashboard/admin/stats").await
    }
}
