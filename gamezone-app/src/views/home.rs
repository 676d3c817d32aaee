use gamezone_client::Queries;
use gamezone_core::{Game, GameListParams, HealthStatus, NormalizedError};
use serde::Serialize;

use super::or_fallback;

const FEATURED_COUNT: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub featured: Vec<Game>,
    pub health: Option<HealthStatus>,
    pub backend_up: bool,
    pub error: Option<NormalizedError>,
}

impl HomeView {
    /// First games of the catalog plus backend health, loaded concurrently.
    pub async fn load(queries: &Queries) -> Self {
        let params = GameListParams::new();
        let (games, health) = tokio::join!(queries.games(&params), queries.health());

        let (mut featured, error) = or_fallback(games, Vec::new);
        featured.truncate(FEATURED_COUNT);
        let health = health.ok().flatten().map(|read| read.into_value());
        let backend_up = health.as_ref().map(HealthStatus::is_up).unwrap_or(false);

        Self {
            featured,
            health,
            backend_up,
            error,
        }
    }
}
