//! GameZone Core - Entity Types
//!
//! Pure data structures shared by the cache, client and app crates. No I/O
//! lives here.

pub mod config;
pub mod entities;
pub mod error;
pub mod identity;

pub use config::RetryConfig;
pub use entities::*;
pub use error::{ApiError, ApiResult, FieldError, NormalizedError};
pub use identity::{
    AdminId, Credentials, GameId, Identity, MemberId, ProductId, RechargeId, Role, TransactionId,
};
