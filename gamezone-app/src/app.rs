//! Application context: client singletons, current route, notifications.

use gamezone_client::{ClientContext, SessionEvent};
use gamezone_core::{Credentials, Identity};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::nav::{Access, AdminSection, Guard, Route};
use crate::notifications::{Notification, Notifications};
use crate::scope::{ScopeHandle, ViewScope};
use crate::views::{
    AdminDashboardView, AdminSectionView, GameDetailView, GamesCatalogView, HomeView, LoginForm,
    LoginOutcome, LoginTab, SignupForm, UserDashboardView, ViewModel,
};

pub struct App {
    pub ctx: ClientContext,
    pub notifications: Notifications,
    route: Route,
    /// Route a guard or expiry interrupted, resumed after login.
    resume: Option<Route>,
    scope: ViewScope,
    events: broadcast::Receiver<SessionEvent>,
}

impl App {
    pub fn new(ctx: ClientContext) -> Self {
        let events = ctx.session.subscribe();
        Self {
            ctx,
            notifications: Notifications::new(),
            route: Route::Home,
            resume: None,
            scope: ViewScope::new("home"),
            events,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn identity(&self) -> Option<Identity> {
        self.ctx.session.current()
    }

    /// Navigate to `path`, applying route guards. Returns the route actually
    /// shown.
    pub fn navigate(&mut self, path: &str) -> &Route {
        self.handle_session_events();
        let requested = Route::parse(path);
        let identity = self.identity();
        let target = match requested.guard(identity.as_ref()) {
            Guard::Allow => requested,
            Guard::Redirect { to, from } => {
                info!(from = %from, to = %to, "navigation redirected");
                self.resume = Some(from);
                to
            }
        };
        self.show(target);
        &self.route
    }

    fn show(&mut self, route: Route) {
        // Replacing the scope tears down the previous view.
        self.scope = ViewScope::new(route.title());
        self.route = route;
    }

    /// Apply pending session events. An expiry clears cached data and sends
    /// the user to the login page, once per event.
    pub fn handle_session_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::Expired { redirect_to }) => {
                    handled += 1;
                    warn!("session expired");
                    self.ctx.cache().clear();
                    if self.route.access() != Access::Public {
                        self.resume = Some(self.route.clone());
                    }
                    self.show(Route::parse(&redirect_to));
                    self.notifications.push(Notification::error(
                        "Session expired",
                        "Please log in again.",
                    ));
                }
                Ok(_) => handled += 1,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "session events lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    /// Log in and navigate to the resumed route or the role's home.
    pub async fn login(&mut self, credentials: &Credentials) -> bool {
        let mut form = LoginForm::new(self.resume.take());
        form.tab = match credentials {
            Credentials::Admin { .. } => LoginTab::Admin,
            Credentials::Member { .. } => LoginTab::Member,
        };
        form.input = match credentials {
            Credentials::Admin { username } => username.clone(),
            Credentials::Member { email } => email.clone(),
        };

        match form.submit(&self.ctx.store).await {
            LoginOutcome::Navigate(route) => {
                self.handle_session_events();
                self.notifications
                    .push(Notification::success("Welcome", "Login successful"));
                let path = route.path();
                self.navigate(&path);
                true
            }
            LoginOutcome::Failed(message) => {
                self.resume = form.redirect_to.take();
                self.notifications.push(Notification::error("Login failed", message));
                false
            }
        }
    }

    /// Drop the session and every cached response, then go home.
    pub fn logout(&mut self) {
        self.ctx.store.logout();
        self.ctx.cache().clear();
        self.handle_session_events();
        self.resume = None;
        self.show(Route::Home);
        self.notifications
            .push(Notification::info("Logged out", "See you soon"));
    }

    /// Handle tied to the current view. Work spawned for the view routes its
    /// result through it, so a result that lands after the user navigated
    /// away is discarded.
    pub fn view_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Load the view model for the current route.
    ///
    /// Runs to completion while holding the app, so the route cannot change
    /// underneath it. An expiry hit during the load replaces the result with
    /// the login form.
    pub async fn load_current(&mut self) -> ViewModel {
        let identity = self.identity();
        let queries = &self.ctx.queries;
        let model = match &self.route {
            Route::Home => ViewModel::Home(HomeView::load(queries).await),
            Route::Games(filters) => {
                ViewModel::Games(GamesCatalogView::load(queries, filters.clone()).await)
            }
            Route::GameDetail(id) => ViewModel::GameDetail(
                GameDetailView::load(queries, id, identity.as_ref()).await,
            ),
            Route::Login => ViewModel::Login(LoginForm::new(self.resume.clone())),
            Route::Signup => ViewModel::Signup(SignupForm::new()),
            Route::UserDashboard => ViewModel::UserDashboard(
                UserDashboardView::load(queries, identity.as_ref()).await,
            ),
            Route::Admin(AdminSection::Overview) => {
                ViewModel::AdminDashboard(AdminDashboardView::load(queries).await)
            }
            Route::Admin(section) => {
                ViewModel::AdminSection(AdminSectionView::load(queries, *section).await)
            }
            Route::NotFound(path) => ViewModel::NotFound { path: path.clone() },
        };

        // A 401 during the load may have expired the session.
        if self.handle_session_events() > 0 && self.route == Route::Login {
            return ViewModel::Login(LoginForm::new(self.resume.clone()));
        }
        model
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("route", &self.route)
            .field("resume", &self.resume)
            .field("identity", &self.identity())
            .field("notifications", &self.notifications.len())
            .finish()
    }
}
