//! Login form. The selected tab, not the shape of the input, decides which
//! credential exchange runs.

use gamezone_client::SessionStore;
use gamezone_core::Credentials;
use serde::Serialize;

use crate::nav::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginTab {
    Member,
    Admin,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub tab: LoginTab,
    /// Email on the member tab, username on the admin tab.
    pub input: String,
    pub error: Option<String>,
    /// Where to go after a successful login, if login interrupted a
    /// navigation.
    pub redirect_to: Option<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigate(Route),
    Failed(String),
}

impl LoginForm {
    pub fn new(redirect_to: Option<Route>) -> Self {
        Self {
            tab: LoginTab::Member,
            input: String::new(),
            error: None,
            redirect_to,
        }
    }

    pub fn select_tab(&mut self, tab: LoginTab) {
        if self.tab != tab {
            self.tab = tab;
            self.input.clear();
            self.error = None;
        }
    }

    pub fn credentials(&self) -> Credentials {
        let input = self.input.trim();
        match self.tab {
            LoginTab::Member => Credentials::member(input),
            LoginTab::Admin => Credentials::admin(input),
        }
    }

    pub async fn submit(&mut self, store: &SessionStore) -> LoginOutcome {
        let credentials = self.credentials();
        if credentials.is_blank() {
            let message = match self.tab {
                LoginTab::Member => "Please enter your email",
                LoginTab::Admin => "Please enter your username",
            };
            return self.fail(message);
        }

        if !store.login(&credentials).await {
            let message = match self.tab {
                LoginTab::Member => "Login failed. Check your email and try again.",
                LoginTab::Admin => "Login failed. Check your username and try again.",
            };
            return self.fail(message);
        }

        self.error = None;
        let destination = match (self.redirect_to.take(), store.current()) {
            (Some(route), _) => route,
            (None, Some(identity)) => Route::home_for(identity.role),
            (None, None) => Route::Home,
        };
        LoginOutcome::Navigate(destination)
    }

    fn fail(&mut self, message: &str) -> LoginOutcome {
        self.error = Some(message.to_string());
        LoginOutcome::Failed(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_decides_credentials() {
        let mut form = LoginForm::new(None);
        form.input = " ana@zone.gg ".into();
        assert_eq!(form.credentials(), Credentials::member("ana@zone.gg"));

        form.select_tab(LoginTab::Admin);
        assert!(form.input.is_empty());
        form.input = "admin".into();
        assert_eq!(form.credentials(), Credentials::admin("admin"));
    }
}
