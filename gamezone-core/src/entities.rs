//! Domain records exchanged with the GameZone REST backend.
//!
//! Field names follow the backend's JSON (camelCase, with a few snake_case
//! stragglers on the profile DTO). Optional fields default so that a partial
//! record from an older backend still decodes.

use serde::{Deserialize, Serialize};

use crate::identity::{AdminId, GameId, MemberId, ProductId, RechargeId, TransactionId};

/// Money amounts are carried as the backend's double.
pub type Amount = f64;

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub price: Amount,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GameStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Filters for the catalog listing. Also part of the list query key, so
/// two listings with different filters are cached separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl GameListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Stable `(name, value)` pairs, in field order, for keys and query strings.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(genre) = &self.genre {
            pairs.push(("genre", genre.clone()));
        }
        if let Some(platform) = &self.platform {
            pairs.push(("platform", platform.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameForm {
    pub name: String,
    pub price: Amount,
    pub description: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: String,
    pub price: Amount,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: String,
    pub price: Amount,
    pub stock: i64,
}

// ============================================================================
// MEMBERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    pub email: String,
    #[serde(default)]
    pub balance: Amount,
    #[serde(default)]
    pub joining_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// Signup / admin edit payload for a member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberForm {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: GameId,
    pub name: String,
    #[serde(default)]
    pub price: Amount,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    pub email: String,
    #[serde(default)]
    pub balance: Amount,
    #[serde(default)]
    pub joining_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechargeSummary {
    pub id: RechargeId,
    pub amount: Amount,
    #[serde(default)]
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayedHistory {
    pub id: String,
    #[serde(default)]
    pub date_time: Option<String>,
    pub game_name: String,
    #[serde(default)]
    pub amount: Amount,
}

/// Result of `POST /members/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub member: MemberSummary,
    #[serde(default)]
    pub recharge_history: Vec<RechargeSummary>,
    #[serde(default)]
    pub games: Vec<GameSummary>,
    #[serde(default)]
    pub played_history: Vec<PlayedHistory>,
}

// ============================================================================
// MONEY MOVEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recharge {
    pub id: RechargeId,
    pub member_id: MemberId,
    pub amount: Amount,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecharge {
    pub member_id: MemberId,
    pub amount: Amount,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub member_id: MemberId,
    pub game_id: GameId,
    pub amount: Amount,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub member_id: MemberId,
    pub game_id: GameId,
    pub amount: Amount,
}

// ============================================================================
// DASHBOARDS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub balance: Amount,
    #[serde(default)]
    pub phone_number: String,
}

/// `GET /dashboard/user/:id`. `Default` is the zero state shown when the
/// fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    #[serde(default)]
    pub member: DashboardMember,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub recharges: Vec<Recharge>,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub total_spent: Amount,
    #[serde(default)]
    pub total_recharged: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: String,
    pub amount: Amount,
    #[serde(default)]
    pub date: Option<String>,
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
}

/// `GET /dashboard/admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_members: u64,
    pub total_games: u64,
    pub total_transactions: u64,
    pub total_recharges: u64,
    pub total_revenue: Amount,
    pub total_recharge_amount: Amount,
    pub active_members: u64,
    pub recent_transactions: Vec<RecentActivity>,
    pub recent_recharges: Vec<RecentActivity>,
}

// ============================================================================
// AUTH PAYLOADS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: AdminId,
    pub full_name: String,
    pub email: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAccount {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub balance: Amount,
}

/// `POST /admin/login` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub admin: Option<AdminAccount>,
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /members/login` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<MemberAccount>,
    #[serde(default)]
    pub token: Option<String>,
}

// ============================================================================
// HEALTH
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: Option<String>,
    pub service: Option<String>,
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiTestReply {
    pub message: String,
    pub timestamp: Option<String>,
}
