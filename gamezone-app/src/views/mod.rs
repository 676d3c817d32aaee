//! Page view models: what each route loads and the actions it offers,
//! without any rendering.
//!
//! List and dashboard views fall back to an empty or zero state when a
//! fetch fails and carry the normalized error alongside. Forms surface the
//! normalized message and field errors inline through [`FormError`].

pub mod admin;
pub mod game_detail;
pub mod games;
pub mod home;
pub mod login;
pub mod signup;
pub mod user_dashboard;

pub use admin::{AdminDashboardView, AdminSectionView};
pub use game_detail::GameDetailView;
pub use games::GamesCatalogView;
pub use home::HomeView;
pub use login::{LoginForm, LoginOutcome, LoginTab};
pub use signup::SignupForm;
pub use user_dashboard::{RechargeForm, UserDashboardView};

use gamezone_cache::CacheRead;
use gamezone_core::{ApiError, FieldError, NormalizedError};
use serde::Serialize;

/// Loaded state of the current route.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    Home(HomeView),
    Games(GamesCatalogView),
    GameDetail(GameDetailView),
    Login(LoginForm),
    Signup(SignupForm),
    UserDashboard(UserDashboardView),
    AdminDashboard(AdminDashboardView),
    AdminSection(AdminSectionView),
    NotFound { path: String },
}

/// Inline error for a form or action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormError {
    pub message: String,
    pub field_errors: Vec<FieldError>,
    /// The action hit an expired session. The app redirects to login, so
    /// there is nothing to show inline.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub session_expired: bool,
}

impl FormError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: Vec::new(),
            session_expired: false,
        }
    }

    pub fn invalid(field_errors: Vec<FieldError>) -> Self {
        Self {
            message: "Please correct the highlighted fields".to_string(),
            field_errors,
            session_expired: false,
        }
    }

    fn expired_session() -> Self {
        Self {
            message: String::new(),
            field_errors: Vec::new(),
            session_expired: true,
        }
    }

    /// Whether the form should render this error.
    pub fn is_shown(&self) -> bool {
        !self.session_expired
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field.as_deref() == Some(field))
            .map(|e| e.message.as_str())
    }
}

impl From<ApiError> for FormError {
    fn from(err: ApiError) -> Self {
        let Some(NormalizedError {
            message,
            field_errors,
            ..
        }) = inline_error(&err)
        else {
            return Self::expired_session();
        };
        Self {
            message,
            field_errors,
            session_expired: false,
        }
    }
}

/// The error a view shows for `err`. An expired session shows nothing; the
/// app handles it by redirecting to login.
pub(crate) fn inline_error(err: &ApiError) -> Option<NormalizedError> {
    match err {
        ApiError::AuthExpired => None,
        err => Some(err.normalized()),
    }
}

/// Unwrap a cached read into its value, or the fallback plus the error.
/// A disabled read (missing id) yields the fallback with no error.
pub(crate) fn or_fallback<T>(
    read: Result<Option<CacheRead<T>>, ApiError>,
    fallback: impl FnOnce() -> T,
) -> (T, Option<NormalizedError>) {
    match read {
        Ok(Some(read)) => (read.into_value(), None),
        Ok(None) => (fallback(), None),
        Err(err) => {
            tracing::debug!(error = %err, "view falling back to empty state");
            (fallback(), inline_error(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_from_api_error() {
        let err = ApiError::Http {
            status_code: 400,
            message: "Validation failed".into(),
            field_errors: vec![FieldError::new("email", "taken")],
        };
        let form: FormError = err.into();
        assert_eq!(form.message, "Validation failed");
        assert_eq!(form.for_field("email"), Some("taken"));
        assert_eq!(form.for_field("name"), None);
        assert!(form.is_shown());
    }

    #[test]
    fn test_expired_session_is_not_shown_inline() {
        let form: FormError = ApiError::AuthExpired.into();
        assert!(!form.is_shown());
        assert!(form.message.is_empty());

        let (value, error) = or_fallback::<Vec<u8>>(Err(ApiError::AuthExpired), Vec::new);
        assert!(value.is_empty());
        assert!(error.is_none());
    }

    #[test]
    fn test_fallback_on_error_only() {
        let (value, error) = or_fallback::<Vec<u8>>(Err(ApiError::network("down")), Vec::new);
        assert!(value.is_empty());
        assert_eq!(error.unwrap().status_code, 0);

        let (value, error) = or_fallback::<Vec<u8>>(Ok(None), Vec::new);
        assert!(value.is_empty());
        assert!(error.is_none());
    }
}
