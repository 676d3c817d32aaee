use gamezone_core::{ApiResult, Game, GameForm, GameId, GameListParams};

use super::id_path;
use crate::http::{ApiRequest, HttpClient};

/// The game catalog.
#[derive(Debug, Clone)]
pub struct GamesClient {
    http: HttpClient,
}

impl GamesClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /games`, filters sent as query parameters.
    pub async fn list(&self, params: &GameListParams) -> ApiResult<Vec<Game>> {
        let request = ApiRequest::get("/games").with_query(params.pairs());
        self.http.send_json(&request).await
    }

    /// `GET /games/:id`.
    pub async fn get(&self, id: &GameId) -> ApiResult<Game> {
        self.http.get_json(&id_path("/games", id.as_str())?).await
    }

    /// `POST /games`.
    pub async fn create(&self, form: &GameForm) -> ApiResult<Game> {
        self.http.post_json("/games", form).await
    }

    /// `PUT /games/:id`.
    pub async fn update(&self, id: &GameId, form: &GameForm) -> ApiResult<Game> {
        self.http.put_json(&id_path("/games", id.as_str())?, form).await
    }

    /// `DELETE /games/:id`. The backend answers with no body.
    pub async fn delete(&self, id: &GameId) -> ApiResult<()> {
        self.http.delete(&id_path("/games", id.as_str())?).await
    }
}
