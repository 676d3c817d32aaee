//! Session store: the single authenticated identity and its credential.

pub mod state;
pub mod storage;
pub mod store;

pub use state::{Session, SessionEvent, SessionPhase, LOGIN_PATH};
pub use storage::{
    FileStorage, MemoryStorage, SessionStorage, StorageError, AUTH_TOKEN_KEY, AUTH_USER_KEY,
};
pub use store::SessionStore;
