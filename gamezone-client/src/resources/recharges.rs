use gamezone_core::{ApiResult, CreateRecharge, MemberId, Recharge};

use super::id_path;
use crate::http::HttpClient;

/// Balance top-ups.
#[derive(Debug, Clone)]
pub struct RechargesClient {
    http: HttpClient,
}

impl RechargesClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /recharges`.
    pub async fn list(&self) -> ApiResult<Vec<Recharge>> {
        self.http.get_json("/recharges").await
    }

    /// `GET /recharges/member/:id`.
    pub async fn for_member(&self, member_id: &MemberId) -> ApiResult<Vec<Recharge>> {
        self.http
            .get_json(&id_path("/recharges/member", member_id.as_str())?)
            .await
    }

    /// `POST /recharges`. Never retried.
    pub async fn create(&self, recharge: &CreateRecharge) -> ApiResult<Recharge> {
        self.http.post_json("/recharges", recharge).await
    }
}
