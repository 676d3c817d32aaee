//! Typed resource clients, one REST call per domain action.

pub mod auth;
pub mod dashboard;
pub mod games;
pub mod health;
pub mod members;
pub mod products;
pub mod recharges;
pub mod transactions;

pub use auth::AuthClient;
pub use dashboard::DashboardClient;
pub use games::GamesClient;
pub use health::HealthClient;
pub use members::MembersClient;
pub use products::ProductsClient;
pub use recharges::RechargesClient;
pub use transactions::TransactionsClient;

use gamezone_core::{ApiError, ApiResult};

use crate::http::HttpClient;

/// Every resource client over one shared [`HttpClient`].
#[derive(Debug, Clone)]
pub struct Api {
    http: HttpClient,
}

impl Api {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Client for the login endpoints.
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.http.clone())
    }

    pub fn games(&self) -> GamesClient {
        GamesClient::new(self.http.clone())
    }

    pub fn members(&self) -> MembersClient {
        MembersClient::new(self.http.clone())
    }

    pub fn products(&self) -> ProductsClient {
        ProductsClient::new(self.http.clone())
    }

    pub fn recharges(&self) -> RechargesClient {
        RechargesClient::new(self.http.clone())
    }

    pub fn transactions(&self) -> TransactionsClient {
        TransactionsClient::new(self.http.clone())
    }

    pub fn dashboard(&self) -> DashboardClient {
        DashboardClient::new(self.http.clone())
    }

    pub fn health(&self) -> HealthClient {
        HealthClient::new(self.http.clone())
    }
}

/// `base/id`, refusing a blank id so no request is built for a missing
/// identifier.
pub(crate) fn id_path(base: &str, id: &str) -> ApiResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidRequest {
            reason: format!("missing id for {}", base),
        });
    }
    Ok(format!("{}/{}", base, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_path() {
        assert_eq!(id_path("/games", "g-1").unwrap(), "/games/g-1");
        assert!(matches!(
            id_path("/games", "  "),
            Err(ApiError::InvalidRequest { .. })
        ));
    }
}
