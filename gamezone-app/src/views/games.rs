use gamezone_client::Queries;
use gamezone_core::{Game, GameListParams, NormalizedError};
use serde::Serialize;

use super::or_fallback;

#[derive(Debug, Clone, Serialize)]
pub struct GamesCatalogView {
    pub filters: GameListParams,
    pub games: Vec<Game>,
    pub error: Option<NormalizedError>,
}

impl GamesCatalogView {
    /// Catalog page for `filters`, empty with the error on failure.
    pub async fn load(queries: &Queries, filters: GameListParams) -> Self {
        let (games, error) = or_fallback(queries.games(&filters).await, Vec::new);
        Self {
            filters,
            games,
            error,
        }
    }
}

