use gamezone_core::{ApiResult, CreateTransaction, MemberId, Transaction};

use super::id_path;
use crate::http::HttpClient;

/// Game purchases.
#[derive(Debug, Clone)]
pub struct TransactionsClient {
    http: HttpClient,
}

impl TransactionsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /transactions`.
    pub async fn list(&self) -> ApiResult<Vec<Transaction>> {
        self.http.get_json("/transactions").await
    }

    /// `GET /transactions/member/:id`.
    pub async fn for_member(&self, member_id: &MemberId) -> ApiResult<Vec<Transaction>> {
        self.http
            .get_json(&id_path("/transactions/member", member_id.as_str())?)
            .await
    }

    /// Purchase. Never retried.
    pub async fn create(&self, transaction: &CreateTransaction) -> ApiResult<Transaction> {
        self.http.post_json("/transactions", transaction).await
    }
}
