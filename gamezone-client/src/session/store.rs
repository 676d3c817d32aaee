//! Login and logout on top of [`Session`].

use gamezone_core::{ApiError, Credentials, Identity};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use super::state::{Session, SessionEvent, SessionPhase};
use crate::resources::auth::LoginGrant;
use crate::resources::AuthClient;

#[derive(Debug, Clone)]
pub struct SessionStore {
    session: Session,
    auth: AuthClient,
}

impl SessionStore {
    pub fn new(session: Session, auth: AuthClient) -> Self {
        Self { session, auth }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchange `credentials` for an identity.
    ///
    /// Returns `false` on blank input, a rejected or malformed login
    /// response, a transport failure, or a storage failure; the session
    /// keeps whatever state it had before the call.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        if credentials.is_blank() {
            return false;
        }
        let _loading = self.session.begin_login();

        let exchanged = match credentials {
            Credentials::Admin { username } => self.auth.admin_login(username.trim()).await,
            Credentials::Member { email } => self.auth.member_login(email.trim()).await,
        };
        let grant = match exchanged {
            Ok(grant) => grant,
            Err(err) => {
                log_login_failure(credentials, &err);
                return false;
            }
        };

        let LoginGrant { mut identity, token } = grant;
        let credential = token
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(mint_credential);
        identity.token = Some(credential.clone());

        match self.session.establish(identity, credential) {
            Ok(()) => {
                info!(role = ?credentials.role(), "login succeeded");
                true
            }
            Err(err) => {
                warn!(error = %err, "login succeeded but session could not be persisted");
                false
            }
        }
    }

    /// Clear the session and its storage. No network call.
    pub fn logout(&self) {
        self.session.clear();
    }

    pub fn current(&self) -> Option<Identity> {
        self.session.current()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }
}

/// Opaque credential for backends that issue none.
fn mint_credential() -> String {
    format!("session-{}", Uuid::now_v7())
}

fn log_login_failure(credentials: &Credentials, err: &ApiError) {
    let role = credentials.role();
    if err.status_code() >= 400 && err.status_code() < 500 {
        info!(?role, status = err.status_code(), "login rejected");
    } else {
        warn!(?role, error = %err, "login failed");
    }
}
