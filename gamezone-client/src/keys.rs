//! Query keys, staleness windows and invalidation sets per resource.
//!
//! Keys are hierarchical so one prefix covers a resource kind and every
//! variant under it:
//!
//! ```text
//! ["games"]                       every games query
//! ["games","list"]                every listing, any filters
//! ["games","list",{filters}]      one listing
//! ["games","detail",id]
//! ```

use gamezone_cache::{Freshness, QueryKey};
use gamezone_core::{GameId, GameListParams, MemberId, ProductId};

pub mod games {
    use super::*;

    pub const RESOURCE: &str = "games";

    pub fn all() -> QueryKey {
        QueryKey::new(RESOURCE)
    }

    pub fn lists() -> QueryKey {
        all().push("list")
    }

    pub fn list(params: &GameListParams) -> QueryKey {
        lists().with_params(params.pairs())
    }

    pub fn details() -> QueryKey {
        all().push("detail")
    }

    pub fn detail(id: &GameId) -> QueryKey {
        details().push(id.as_str())
    }

    pub fn list_freshness() -> Freshness {
        Freshness::minutes(5)
    }

    pub fn detail_freshness() -> Freshness {
        Freshness::Always
    }
}

pub mod members {
    use super::*;

    pub const RESOURCE: &str = "members";

    pub fn all() -> QueryKey {
        QueryKey::new(RESOURCE)
    }

    pub fn lists() -> QueryKey {
        all().push("list")
    }

    pub fn details() -> QueryKey {
        all().push("detail")
    }

    pub fn detail(id: &MemberId) -> QueryKey {
        details().push(id.as_str())
    }

    /// Every phone-search profile. Balances live here, so money movement
    /// invalidates the whole prefix.
    pub fn profiles() -> QueryKey {
        all().push("profile")
    }

    pub fn profile(phone: &str) -> QueryKey {
        profiles().push(phone)
    }

    pub fn list_freshness() -> Freshness {
        Freshness::minutes(5)
    }

    pub fn detail_freshness() -> Freshness {
        Freshness::Always
    }
}

pub mod products {
    use super::*;

    pub const RESOURCE: &str = "products";

    pub fn all() -> QueryKey {
        QueryKey::new(RESOURCE)
    }

    pub fn lists() -> QueryKey {
        all().push("list")
    }

    pub fn detail(id: &ProductId) -> QueryKey {
        all().push("detail").push(id.as_str())
    }

    pub fn list_freshness() -> Freshness {
        Freshness::minutes(5)
    }

    pub fn detail_freshness() -> Freshness {
        Freshness::Always
    }
}

pub mod recharges {
    use super::*;

    pub const RESOURCE: &str = "recharges";

    pub fn all() -> QueryKey {
        QueryKey::new(RESOURCE)
    }

    pub fn lists() -> QueryKey {
        all().push("list")
    }

    pub fn member(id: &MemberId) -> QueryKey {
        all().push("member").push(id.as_str())
    }

    pub fn freshness() -> Freshness {
        Freshness::minutes(2)
    }
}

pub mod transactions {
    use super::*;

    pub const RESOURCE: &str = "transactions";

    pub fn all() -> QueryKey {
        QueryKey::new(RESOURCE)
    }

    pub fn lists() -> QueryKey {
        all().push("list")
    }

    pub fn member(id: &MemberId) -> QueryKey {
        all().push("member").push(id.as_str())
    }

    pub fn freshness() -> Freshness {
        Freshness::minutes(2)
    }
}

pub mod dashboard {
    use super::*;

    pub const RESOURCE: &str = "dashboard";

    pub fn all() -> QueryKey {
        QueryKey::new(RESOURCE)
    }

    pub fn user(member_id: &MemberId) -> QueryKey {
        all().push("user").push(member_id.as_str())
    }

    pub fn admin() -> QueryKey {
        all().push("admin")
    }

    pub fn freshness() -> Freshness {
        Freshness::minutes(1)
    }
}

pub mod health {
    use super::*;

    pub const RESOURCE: &str = "health";

    /// Read with the cache's default window (`cache.default_stale_after_ms`,
    /// zero unless configured).
    pub fn status() -> QueryKey {
        QueryKey::new(RESOURCE)
    }
}

// ============================================================================
// INVALIDATION SETS
// ============================================================================

/// Keys a mutation makes stale. Each mutation invalidates its own resource
/// kind plus the cross-referenced keys that embed the same data.
pub mod invalidates {
    use super::*;

    pub fn game_created() -> Vec<QueryKey> {
        vec![games::lists()]
    }

    pub fn game_changed(id: &GameId) -> Vec<QueryKey> {
        vec![games::lists(), games::detail(id)]
    }

    pub fn member_created() -> Vec<QueryKey> {
        vec![members::lists()]
    }

    pub fn member_updated(id: &MemberId) -> Vec<QueryKey> {
        vec![members::lists(), members::detail(id), dashboard::user(id)]
    }

    pub fn member_deleted(id: &MemberId) -> Vec<QueryKey> {
        vec![members::lists(), members::detail(id)]
    }

    pub fn product_created() -> Vec<QueryKey> {
        vec![products::lists()]
    }

    pub fn product_changed(id: &ProductId) -> Vec<QueryKey> {
        vec![products::lists(), products::detail(id)]
    }

    /// Balance-bearing keys of `member_id` plus the admin stats.
    fn money_moved(member_id: &MemberId) -> Vec<QueryKey> {
        vec![
            members::detail(member_id),
            members::profiles(),
            dashboard::user(member_id),
            dashboard::admin(),
        ]
    }

    pub fn recharge_created(member_id: &MemberId) -> Vec<QueryKey> {
        let mut keys = vec![recharges::lists(), recharges::member(member_id)];
        keys.extend(money_moved(member_id));
        keys
    }

    pub fn purchase_made(member_id: &MemberId) -> Vec<QueryKey> {
        let mut keys = vec![transactions::lists(), transactions::member(member_id)];
        keys.extend(money_moved(member_id));
        keys
    }
}
