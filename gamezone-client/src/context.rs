//! Wiring of the client-side singletons.

use gamezone_cache::{CacheConfig, QueryCache};
use gamezone_core::ApiResult;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::http::HttpClient;
use crate::queries::Queries;
use crate::resources::Api;
use crate::session::{FileStorage, Session, SessionStorage, SessionStore};

/// Session, HTTP client, resource clients, cache and session store built
/// once from one [`ClientConfig`] and shared by reference.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub config: ClientConfig,
    pub session: Session,
    pub http: HttpClient,
    pub api: Api,
    pub store: SessionStore,
    pub queries: Queries,
}

impl ClientContext {
    /// Build over the file storage named by `config.session_path`.
    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        let storage = Arc::new(FileStorage::new(config.session_path.clone()));
        Self::with_storage(config, storage)
    }

    /// Build over any storage and restore the persisted session.
    pub fn with_storage(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> ApiResult<Self> {
        let session = Session::restored(storage);
        let http = HttpClient::new(&config, session.clone())?;
        let api = Api::new(http.clone());
        let store = SessionStore::new(session.clone(), api.auth());
        let cache = QueryCache::new(
            CacheConfig::new()
                .with_max_entries(config.cache.max_entries)
                .with_default_stale_after(Duration::from_millis(config.cache.default_stale_after_ms)),
        );
        let queries = Queries::new(api.clone(), cache);
        Ok(Self {
            config,
            session,
            http,
            api,
            store,
            queries,
        })
    }

    pub fn cache(&self) -> &QueryCache {
        self.queries.cache()
    }
}
