use gamezone_client::Queries;
use gamezone_core::{CreateTransaction, Game, GameId, Identity, NormalizedError, Transaction};
use serde::Serialize;

use super::{inline_error, FormError};

#[derive(Debug, Clone, Serialize)]
pub struct GameDetailView {
    pub game_id: GameId,
    pub game: Option<Game>,
    /// A logged-in member may buy; admins and guests may not.
    pub can_purchase: bool,
    pub error: Option<NormalizedError>,
}

impl GameDetailView {
    /// Load one game. A blank id issues no request and yields no game.
    pub async fn load(queries: &Queries, id: &GameId, identity: Option<&Identity>) -> Self {
        let (game, error) = match queries.game(id).await {
            Ok(read) => (read.map(|r| r.into_value()), None),
            Err(err) => (None, inline_error(&err)),
        };
        let can_purchase = game.is_some() && buyer(identity).is_some();
        Self {
            game_id: id.clone(),
            game,
            can_purchase,
            error,
        }
    }

    /// Buy the loaded game at its listed price.
    pub async fn purchase(
        &self,
        queries: &Queries,
        identity: Option<&Identity>,
    ) -> Result<Transaction, FormError> {
        let game = self
            .game
            .as_ref()
            .ok_or_else(|| FormError::new("Game is not loaded"))?;
        let member_id = buyer(identity)
            .ok_or_else(|| FormError::new("Please log in as a member to purchase"))?;

        let request = CreateTransaction {
            member_id,
            game_id: game.id.clone(),
            amount: game.price,
        };
        Ok(queries.purchase(&request).await?)
    }
}

fn buyer(identity: Option<&Identity>) -> Option<gamezone_core::MemberId> {
    identity
        .filter(|i| !i.is_admin())
        .and_then(|i| i.member_id.clone())
        .filter(|id| !id.is_blank())
}
