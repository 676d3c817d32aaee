//! GameZone Test Utilities
//!
//! Shared test infrastructure for the GameZone workspace:
//! - Proptest generators for ids, identities and catalog records
//! - JSON fixtures shaped like the backend's responses
//! - Client wiring against a `wiremock` server with in-memory storage
//! - Storage that fails on demand, for atomicity tests

pub use gamezone_client::{ClientConfig, ClientContext, MemoryStorage, SessionStorage, StorageError};
pub use gamezone_core::{
    ApiError, ApiResult, Credentials, Game, GameId, GameListParams, Identity, MemberId, Role,
    RetryConfig,
};

use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for GameZone types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_id() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,12}"
    }

    pub fn arb_game_id() -> impl Strategy<Value = GameId> {
        arb_id().prop_map(GameId::new)
    }

    pub fn arb_member_id() -> impl Strategy<Value = MemberId> {
        arb_id().prop_map(MemberId::new)
    }

    pub fn arb_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Admin), Just(Role::User)]
    }

    pub fn arb_identity() -> impl Strategy<Value = Identity> {
        (arb_id(), "[A-Z][a-z]{1,10}", arb_role(), proptest::option::of("[0-9]{3}-[0-9]{4}"))
            .prop_map(|(id, name, role, phone)| Identity {
                email: format!("{}@zone.gg", name.to_lowercase()),
                member_id: (role == Role::User).then(|| MemberId::new(id.clone())),
                id,
                name,
                role,
                phone_number: phone,
                token: None,
            })
    }

    pub fn arb_credentials() -> impl Strategy<Value = Credentials> {
        prop_oneof![
            "[a-z]{1,10}".prop_map(|username: String| Credentials::admin(username)),
            "[a-z]{1,10}@[a-z]{2,6}\\.com".prop_map(|email: String| Credentials::member(email)),
        ]
    }

    pub fn arb_game_list_params() -> impl Strategy<Value = GameListParams> {
        (
            proptest::option::of(0u32..20),
            proptest::option::of(1u32..50),
            proptest::option::of("[A-Z][a-z]{2,8}"),
            proptest::option::of("[A-Z]{2,4}"),
            proptest::option::of("[a-z ]{0,12}"),
        )
            .prop_map(|(page, size, genre, platform, search)| GameListParams {
                page,
                size,
                genre,
                platform,
                search,
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Backend-shaped JSON payloads and ready-made identities.

    use super::*;

    pub fn game_json(id: &str, name: &str, price: f64) -> Value {
        json!({
            "id": id,
            "name": name,
            "price": price,
            "description": format!("{} description", name),
            "genre": "Action",
            "platform": "PC",
            "status": "ACTIVE"
        })
    }

    pub fn games_json() -> Value {
        json!([
            game_json("g1", "Neon Drift", 4.99),
            game_json("g2", "Castle Siege", 2.5),
            game_json("g3", "Orbit", 1.0),
            game_json("g4", "Deep Dive", 3.25),
            game_json("g5", "Pixel Kart", 0.99),
        ])
    }

    pub fn member_json(id: &str) -> Value {
        json!({
            "id": id,
            "name": "Ana",
            "phoneNumber": "555-0101",
            "email": "ana@zone.gg",
            "balance": 20.0,
            "isActive": true
        })
    }

    pub fn admin_login_ok() -> Value {
        json!({
            "success": true,
            "message": "Login successful",
            "admin": {
                "id": "a1",
                "fullName": "Root Admin",
                "email": "admin@zone.gg",
                "username": "admin"
            }
        })
    }

    pub fn member_login_ok(id: &str) -> Value {
        json!({
            "success": true,
            "message": "Login successful",
            "user": {
                "id": id,
                "name": "Ana",
                "email": "ana@zone.gg",
                "phoneNumber": "555-0101",
                "balance": 20.0
            }
        })
    }

    pub fn login_rejected() -> Value {
        json!({ "success": false, "message": "Invalid credentials" })
    }

    pub fn member_profile_json(member_id: &str, balance: f64) -> Value {
        json!({
            "member": {
                "id": member_id,
                "name": "Ana",
                "phoneNumber": "555-0101",
                "email": "ana@zone.gg",
                "balance": balance,
                "isActive": true
            },
            "recharge_history": [],
            "games": [],
            "played_history": []
        })
    }

    pub fn transaction_json(id: &str, member_id: &str, game_id: &str, amount: f64) -> Value {
        json!({
            "id": id,
            "memberId": member_id,
            "gameId": game_id,
            "amount": amount,
            "date": "2026-01-01T10:00:00"
        })
    }

    pub fn recharge_json(id: &str, member_id: &str, amount: f64) -> Value {
        json!({
            "id": id,
            "memberId": member_id,
            "amount": amount,
            "paymentMethod": "CARD",
            "date": "2026-01-01T10:00:00"
        })
    }

    pub fn user_dashboard_json(member_id: &str) -> Value {
        json!({
            "member": {
                "id": member_id,
                "name": "Ana",
                "email": "ana@zone.gg",
                "balance": 20.0,
                "phoneNumber": "555-0101"
            },
            "transactions": [transaction_json("t1", member_id, "g1", 4.99)],
            "recharges": [recharge_json("r1", member_id, 25.0)],
            "games": [game_json("g1", "Neon Drift", 4.99)],
            "totalSpent": 4.99,
            "totalRecharged": 25.0
        })
    }

    pub fn admin_stats_json() -> Value {
        json!({
            "totalMembers": 12,
            "totalGames": 5,
            "totalTransactions": 40,
            "totalRecharges": 18,
            "totalRevenue": 199.5,
            "totalRechargeAmount": 450.0,
            "activeMembers": 9,
            "recentTransactions": [],
            "recentRecharges": []
        })
    }

    pub fn health_json() -> Value {
        json!({
            "status": "UP",
            "timestamp": "2026-01-01T10:00:00",
            "service": "GameZone Backend",
            "version": "1.0.0"
        })
    }

    pub fn admin_identity() -> Identity {
        Identity {
            id: "a1".into(),
            name: "Root Admin".into(),
            email: "admin@zone.gg".into(),
            role: Role::Admin,
            member_id: None,
            phone_number: None,
            token: Some("tok-admin".into()),
        }
    }

    pub fn member_identity(id: &str) -> Identity {
        Identity {
            id: id.into(),
            name: "Ana".into(),
            email: "ana@zone.gg".into(),
            role: Role::User,
            member_id: Some(MemberId::new(id)),
            phone_number: Some("555-0101".into()),
            token: Some("tok-member".into()),
        }
    }

    /// Config pointing at `base_url` with fast, jitter-free retries.
    pub fn test_config(base_url: &str) -> ClientConfig {
        ClientConfig {
            api_base_url: base_url.to_string(),
            request_timeout_ms: 2_000,
            retry: RetryConfig {
                max_retries: 3,
                initial_ms: 5,
                max_ms: 20,
                multiplier: 2.0,
                jitter_ms: 0,
            },
            ..ClientConfig::default()
        }
    }

    /// A client context over in-memory storage, already restored.
    pub fn test_context(base_url: &str) -> (ClientContext, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = ClientContext::with_storage(test_config(base_url), storage.clone())
            .unwrap_or_else(|err| panic!("test context: {}", err));
        (ctx, storage)
    }

    /// A test context whose session is already authenticated as `identity`.
    pub fn logged_in_context(base_url: &str, identity: Identity) -> (ClientContext, Arc<MemoryStorage>) {
        let (ctx, storage) = test_context(base_url);
        let credential = identity.token.clone().unwrap_or_else(|| "tok".into());
        ctx.session
            .establish(identity, credential)
            .unwrap_or_else(|err| panic!("establish: {}", err));
        (ctx, storage)
    }
}

// ============================================================================
// MOCK BACKEND
// ============================================================================

pub mod backend {
    //! `wiremock` helpers for the common endpoints.

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    pub async fn mount_games(server: &MockServer) {
        mount_json(server, "GET", "/games", 200, fixtures::games_json()).await;
    }

    pub async fn mount_health(server: &MockServer) {
        mount_json(server, "GET", "/api/health", 200, fixtures::health_json()).await;
    }

    pub async fn mount_admin_login(server: &MockServer) {
        mount_json(server, "POST", "/admin/login", 200, fixtures::admin_login_ok()).await;
    }

    pub async fn mount_member_login(server: &MockServer, member_id: &str) {
        mount_json(
            server,
            "POST",
            "/members/login",
            200,
            fixtures::member_login_ok(member_id),
        )
        .await;
    }

    /// Count of received requests matching `verb` and `route`.
    pub async fn hits(server: &MockServer, verb: &str, route: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == route)
            .count()
    }
}

// ============================================================================
// STORAGE DOUBLES
// ============================================================================

/// Memory storage whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SessionStorage for FlakyStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write refused".to_string()));
        }
        self.inner.write_all(entries)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.inner.remove_all(keys)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on normalized client errors.

    use super::*;

    #[track_caller]
    pub fn assert_status<T: std::fmt::Debug>(result: &ApiResult<T>, status: u16) {
        match result {
            Err(err) => assert_eq!(err.status_code(), status, "unexpected error: {:?}", err),
            Ok(value) => panic!("Expected HTTP {} error, got Ok: {:?}", status, value),
        }
    }

    #[track_caller]
    pub fn assert_auth_expired<T: std::fmt::Debug>(result: &ApiResult<T>) {
        match result {
            Err(ApiError::AuthExpired) => {}
            other => panic!("Expected AuthExpired, got: {:?}", other),
        }
    }
}
