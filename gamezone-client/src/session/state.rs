//! Shared session state.
//!
//! One [`Session`] is shared by the HTTP client (which reads the credential
//! and reports expiry) and the [`SessionStore`](super::SessionStore) (which
//! logs in and out). Every transition bumps a generation counter; an expiry
//! only applies if no transition happened since the failing request was sent,
//! so a burst of concurrent 401s clears the session exactly once.

use gamezone_core::{Identity, Role};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::storage::{SessionStorage, StorageError, AUTH_TOKEN_KEY, AUTH_USER_KEY};

/// Where unauthenticated users are sent after an expiry.
pub const LOGIN_PATH: &str = "/login";

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Restoring,
    Anonymous,
    Authenticated,
}

/// Notifications for the application shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { role: Role },
    LoggedOut,
    /// A request came back 401. The session is already cleared; the shell
    /// should navigate to `redirect_to`.
    Expired { redirect_to: String },
}

#[derive(Debug, Clone)]
struct Snapshot {
    phase: SessionPhase,
    identity: Option<Identity>,
    credential: Option<String>,
}

impl Snapshot {
    fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            identity: None,
            credential: None,
        }
    }
}

struct Inner {
    state: RwLock<Snapshot>,
    storage: Arc<dyn SessionStorage>,
    generation: AtomicU64,
    logins_in_flight: AtomicUsize,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Session")
            .field("phase", &state.phase)
            .field("identity", &state.identity)
            .field("generation", &self.generation())
            .finish()
    }
}

impl Session {
    /// A session that has not looked at storage yet.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(Snapshot {
                    phase: SessionPhase::Uninitialized,
                    identity: None,
                    credential: None,
                }),
                storage,
                generation: AtomicU64::new(0),
                logins_in_flight: AtomicUsize::new(0),
                events,
            }),
        }
    }

    /// Build and immediately restore from storage.
    pub fn restored(storage: Arc<dyn SessionStorage>) -> Self {
        let session = Self::new(storage);
        session.restore();
        session
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load the persisted identity. Anything incomplete, unparseable or
    /// malformed yields an anonymous session and is wiped from storage.
    pub fn restore(&self) -> SessionPhase {
        {
            let mut state = self.write();
            state.phase = SessionPhase::Restoring;
        }

        let restored = match self.load_persisted() {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "discarding unreadable session");
                None
            }
        };

        let mut state = self.write();
        match restored {
            Some((identity, credential)) => {
                info!(role = ?identity.role, "session restored");
                *state = Snapshot {
                    phase: SessionPhase::Authenticated,
                    identity: Some(identity),
                    credential: Some(credential),
                };
            }
            None => {
                if let Err(err) = self.inner.storage.remove_all(&[AUTH_TOKEN_KEY, AUTH_USER_KEY]) {
                    warn!(error = %err, "failed to clear session storage");
                }
                *state = Snapshot::anonymous();
            }
        }
        self.bump();
        state.phase
    }

    fn load_persisted(&self) -> Result<Option<(Identity, String)>, StorageError> {
        let storage = &self.inner.storage;
        let (Some(credential), Some(user)) =
            (storage.read(AUTH_TOKEN_KEY)?, storage.read(AUTH_USER_KEY)?)
        else {
            return Ok(None);
        };
        if credential.trim().is_empty() {
            return Ok(None);
        }
        let identity: Identity = match serde_json::from_str(&user) {
            Ok(identity) => identity,
            Err(err) => {
                debug!(error = %err, "persisted identity does not parse");
                return Ok(None);
            }
        };
        if !identity.is_well_formed() {
            return Ok(None);
        }
        Ok(Some((identity, credential)))
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().phase
    }

    pub fn current(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    pub fn credential(&self) -> Option<String> {
        self.read().credential.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().phase == SessionPhase::Authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.read()
            .identity
            .as_ref()
            .map(Identity::is_admin)
            .unwrap_or(false)
    }

    /// True while restoring or while a login is in progress.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.read().phase,
            SessionPhase::Uninitialized | SessionPhase::Restoring
        ) || self.inner.logins_in_flight.load(Ordering::SeqCst) > 0
    }

    /// Transition counter. Requests capture it before sending.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn begin_login(&self) -> LoginGuard {
        self.inner.logins_in_flight.fetch_add(1, Ordering::SeqCst);
        LoginGuard {
            session: self.clone(),
        }
    }

    /// Persist and adopt an authenticated identity. Storage is written first;
    /// if that fails the in-memory state is left unchanged.
    pub fn establish(&self, identity: Identity, credential: String) -> Result<(), StorageError> {
        let user = serde_json::to_string(&identity)?;
        let mut state = self.write();
        self.inner
            .storage
            .write_all(&[(AUTH_TOKEN_KEY, credential.as_str()), (AUTH_USER_KEY, user.as_str())])?;

        let role = identity.role;
        *state = Snapshot {
            phase: SessionPhase::Authenticated,
            identity: Some(identity),
            credential: Some(credential),
        };
        self.bump();
        drop(state);

        info!(?role, "session established");
        self.emit(SessionEvent::LoggedIn { role });
        Ok(())
    }

    /// Drop the identity and wipe storage. Never fails; a storage error is
    /// logged and the in-memory state is cleared regardless.
    pub fn clear(&self) {
        let mut state = self.write();
        self.wipe_storage();
        *state = Snapshot::anonymous();
        self.bump();
        drop(state);

        info!("session cleared");
        self.emit(SessionEvent::LoggedOut);
    }

    /// Clear the session because a request sent under `observed` came back
    /// 401. Returns `false` if the session already moved on (another 401
    /// expired it, or a login or logout happened since).
    pub fn expire(&self, observed: u64) -> bool {
        let mut state = self.write();
        if self.generation() != observed || state.phase != SessionPhase::Authenticated {
            return false;
        }
        self.wipe_storage();
        *state = Snapshot::anonymous();
        self.bump();
        drop(state);

        warn!("session expired, redirecting to login");
        self.emit(SessionEvent::Expired {
            redirect_to: LOGIN_PATH.to_string(),
        });
        true
    }

    fn wipe_storage(&self) {
        if let Err(err) = self.inner.storage.remove_all(&[AUTH_TOKEN_KEY, AUTH_USER_KEY]) {
            warn!(error = %err, "failed to clear session storage");
        }
    }

    fn bump(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

/// Marks a login as in progress for [`Session::is_loading`].
pub(crate) struct LoginGuard {
    session: Session,
}

impl Drop for LoginGuard {
    fn drop(&mut self) {
        self.session
            .inner
            .logins_in_flight
            .fetch_sub(1, Ordering::SeqCst);
    }
}
