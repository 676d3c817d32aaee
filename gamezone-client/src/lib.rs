//! GameZone client: HTTP wrapper, resource clients, session store and the
//! cached query layer that views read through.
//!
//! ```ignore
//! let ctx = ClientContext::from_config(ClientConfig::load()?)?;
//! ctx.store.login(&Credentials::member("ana@zone.gg")).await;
//! let games = ctx.queries.games(&GameListParams::new()).await?;
//! ```

pub mod config;
pub mod context;
pub mod http;
pub mod keys;
pub mod queries;
pub mod resources;
pub mod session;

pub use config::{CacheSettings, ClientConfig, ConfigError, LogFormat};
pub use context::ClientContext;
pub use http::{ApiRequest, ApiResponse, HttpClient};
pub use queries::{Queries, Query};
pub use resources::Api;
pub use session::{
    FileStorage, MemoryStorage, Session, SessionEvent, SessionPhase, SessionStorage, SessionStore,
    StorageError,
};
