//! Cached reads and invalidating mutations over the resource clients.
//!
//! Reads go through the [`QueryCache`] with each resource's staleness
//! window. Mutations bypass the cache and, on success, invalidate the keys
//! listed in [`keys::invalidates`].

use gamezone_cache::{CacheRead, QueryCache};
use gamezone_core::{
    AdminStats, ApiResult, ApiTestReply, CreateRecharge, CreateTransaction, Game, GameForm,
    GameId, GameListParams, HealthStatus, Member, MemberForm, MemberId, MemberProfile, Product,
    ProductForm, ProductId, Recharge, Transaction, UserDashboard,
};

use crate::keys::{self, invalidates};
use crate::resources::Api;

/// A cached read: `Ok(None)` when the key is disabled (blank id).
pub type Query<T> = ApiResult<Option<CacheRead<T>>>;

/// Resource reads through the shared cache. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Queries {
    api: Api,
    cache: QueryCache,
}

impl Queries {
    /// Queries over `api`, caching in `cache`.
    pub fn new(api: Api, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    /// The uncached resource clients.
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The shared cache, for invalidation and inspection.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ------------------------------------------------------------------
    // games
    // ------------------------------------------------------------------

    /// Catalog listing for `params`. Each filter set is cached separately.
    pub async fn games(&self, params: &GameListParams) -> Query<Vec<Game>> {
        let client = self.api.games();
        let params_owned = params.clone();
        self.cache
            .read(&keys::games::list(params), keys::games::list_freshness(), move || async move {
                client.list(&params_owned).await
            })
            .await
    }

    /// One game. Disabled for a blank id.
    pub async fn game(&self, id: &GameId) -> Query<Game> {
        let client = self.api.games();
        let id_owned = id.clone();
        self.cache
            .read(&keys::games::detail(id), keys::games::detail_freshness(), move || async move {
                client.get(&id_owned).await
            })
            .await
    }

    /// Create a game and invalidate the listings.
    pub async fn create_game(&self, form: &GameForm) -> ApiResult<Game> {
        let client = self.api.games();
        self.cache
            .mutate_and_invalidate(&invalidates::game_created(), || client.create(form))
            .await
    }

    /// Update a game and invalidate the listings and its detail.
    pub async fn update_game(&self, id: &GameId, form: &GameForm) -> ApiResult<Game> {
        let client = self.api.games();
        self.cache
            .mutate_and_invalidate(&invalidates::game_changed(id), || client.update(id, form))
            .await
    }

    /// Delete a game and invalidate the listings and its detail.
    pub async fn delete_game(&self, id: &GameId) -> ApiResult<()> {
        let client = self.api.games();
        self.cache
            .mutate_and_invalidate(&invalidates::game_changed(id), || client.delete(id))
            .await
    }

    // ------------------------------------------------------------------
    // members
    // ------------------------------------------------------------------

    /// Every member.
    pub async fn members(&self) -> Query<Vec<Member>> {
        let client = self.api.members();
        self.cache
            .read(&keys::members::lists(), keys::members::list_freshness(), move || async move {
                client.list().await
            })
            .await
    }

    /// One member. Disabled for a blank id.
    pub async fn member(&self, id: &MemberId) -> Query<Member> {
        let client = self.api.members();
        let id_owned = id.clone();
        self.cache
            .read(&keys::members::detail(id), keys::members::detail_freshness(), move || async move {
                client.get(&id_owned).await
            })
            .await
    }

    /// Phone search, cached under the profile key.
    pub async fn member_profile(&self, phone: &str) -> Query<MemberProfile> {
        let client = self.api.members();
        let phone_owned = phone.trim().to_string();
        self.cache
            .read(
                &keys::members::profile(phone.trim()),
                keys::members::detail_freshness(),
                move || async move { client.search_by_phone(&phone_owned).await },
            )
            .await
    }

    /// Register a member (signup) and invalidate the member list.
    pub async fn create_member(&self, form: &MemberForm) -> ApiResult<Member> {
        let client = self.api.members();
        self.cache
            .mutate_and_invalidate(&invalidates::member_created(), || client.create(form))
            .await
    }

    /// Update a member, its detail and its dashboard.
    pub async fn update_member(&self, id: &MemberId, form: &MemberForm) -> ApiResult<Member> {
        let client = self.api.members();
        self.cache
            .mutate_and_invalidate(&invalidates::member_updated(id), || client.update(id, form))
            .await
    }

    /// Delete a member and invalidate the list and its detail.
    pub async fn delete_member(&self, id: &MemberId) -> ApiResult<()> {
        let client = self.api.members();
        self.cache
            .mutate_and_invalidate(&invalidates::member_deleted(id), || client.delete(id))
            .await
    }

    // ------------------------------------------------------------------
    // products
    // ------------------------------------------------------------------

    /// Every product.
    pub async fn products(&self) -> Query<Vec<Product>> {
        let client = self.api.products();
        self.cache
            .read(&keys::products::lists(), keys::products::list_freshness(), move || async move {
                client.list().await
            })
            .await
    }

    /// One product. Disabled for a blank id.
    pub async fn product(&self, id: &ProductId) -> Query<Product> {
        let client = self.api.products();
        let id_owned = id.clone();
        self.cache
            .read(&keys::products::detail(id), keys::products::detail_freshness(), move || async move {
                client.get(&id_owned).await
            })
            .await
    }

    /// Create a product and invalidate the list.
    pub async fn create_product(&self, form: &ProductForm) -> ApiResult<Product> {
        let client = self.api.products();
        self.cache
            .mutate_and_invalidate(&invalidates::product_created(), || client.create(form))
            .await
    }

    /// Update a product and invalidate the list and its detail.
    pub async fn update_product(&self, id: &ProductId, form: &ProductForm) -> ApiResult<Product> {
        let client = self.api.products();
        self.cache
            .mutate_and_invalidate(&invalidates::product_changed(id), || client.update(id, form))
            .await
    }

    /// Delete a product and invalidate the list and its detail.
    pub async fn delete_product(&self, id: &ProductId) -> ApiResult<()> {
        let client = self.api.products();
        self.cache
            .mutate_and_invalidate(&invalidates::product_changed(id), || client.delete(id))
            .await
    }

    // ------------------------------------------------------------------
    // money movement
    // ------------------------------------------------------------------

    /// Every recharge, for the admin views.
    pub async fn recharges(&self) -> Query<Vec<Recharge>> {
        let client = self.api.recharges();
        self.cache
            .read(&keys::recharges::lists(), keys::recharges::freshness(), move || async move {
                client.list().await
            })
            .await
    }

    /// Recharges of one member. Disabled for a blank id.
    pub async fn member_recharges(&self, member_id: &MemberId) -> Query<Vec<Recharge>> {
        let client = self.api.recharges();
        let id_owned = member_id.clone();
        self.cache
            .read(&keys::recharges::member(member_id), keys::recharges::freshness(), move || async move {
                client.for_member(&id_owned).await
            })
            .await
    }

    /// Top up a member's balance. Invalidates the recharge lists and every
    /// key that shows the balance.
    pub async fn recharge(&self, recharge: &CreateRecharge) -> ApiResult<Recharge> {
        let client = self.api.recharges();
        self.cache
            .mutate_and_invalidate(&invalidates::recharge_created(&recharge.member_id), || {
                client.create(recharge)
            })
            .await
    }

    /// Every transaction, for the admin views.
    pub async fn transactions(&self) -> Query<Vec<Transaction>> {
        let client = self.api.transactions();
        self.cache
            .read(&keys::transactions::lists(), keys::transactions::freshness(), move || async move {
                client.list().await
            })
            .await
    }

    /// Purchases of one member. Disabled for a blank id.
    pub async fn member_transactions(&self, member_id: &MemberId) -> Query<Vec<Transaction>> {
        let client = self.api.transactions();
        let id_owned = member_id.clone();
        self.cache
            .read(
                &keys::transactions::member(member_id),
                keys::transactions::freshness(),
                move || async move { client.for_member(&id_owned).await },
            )
            .await
    }

    /// Purchase a game. Invalidates the transaction lists and every key that
    /// shows the buyer's balance.
    pub async fn purchase(&self, transaction: &CreateTransaction) -> ApiResult<Transaction> {
        let client = self.api.transactions();
        self.cache
            .mutate_and_invalidate(&invalidates::purchase_made(&transaction.member_id), || {
                client.create(transaction)
            })
            .await
    }

    // ------------------------------------------------------------------
    // dashboards and health
    // ------------------------------------------------------------------

    /// The member's dashboard: profile, history, owned games and totals.
    pub async fn user_dashboard(&self, member_id: &MemberId) -> Query<UserDashboard> {
        let client = self.api.dashboard();
        let id_owned = member_id.clone();
        self.cache
            .read(&keys::dashboard::user(member_id), keys::dashboard::freshness(), move || async move {
                client.user(&id_owned).await
            })
            .await
    }

    /// Totals and recent activity for the admin dashboard.
    pub async fn admin_stats(&self) -> Query<AdminStats> {
        let client = self.api.dashboard();
        self.cache
            .read(&keys::dashboard::admin(), keys::dashboard::freshness(), move || async move {
                client.admin_stats().await
            })
            .await
    }

    /// Backend health, kept for the cache's default window.
    pub async fn health(&self) -> Query<HealthStatus> {
        let client = self.api.health();
        self.cache
            .read_default(&keys::health::status(), move || async move { client.health().await })
            .await
    }

    /// `GET /api/test` connectivity check. Never cached.
    pub async fn api_test(&self) -> ApiResult<ApiTestReply> {
        self.api.health().test().await
    }
}
