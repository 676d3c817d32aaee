//! Routes and route guards.

use gamezone_core::{GameId, GameListParams, Identity, Role};
use serde::Serialize;
use std::fmt;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSection {
    Overview,
    Games,
    Members,
    Products,
    Transactions,
    Recharges,
}

impl AdminSection {
    pub fn all() -> &'static [AdminSection] {
        &[
            AdminSection::Overview,
            AdminSection::Games,
            AdminSection::Members,
            AdminSection::Products,
            AdminSection::Transactions,
            AdminSection::Recharges,
        ]
    }

    fn segment(&self) -> Option<&'static str> {
        match self {
            AdminSection::Overview => None,
            AdminSection::Games => Some("games"),
            AdminSection::Members => Some("members"),
            AdminSection::Products => Some("products"),
            AdminSection::Transactions => Some("transactions"),
            AdminSection::Recharges => Some("recharges"),
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.segment() == Some(segment))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "param", rename_all = "snake_case")]
pub enum Route {
    Home,
    /// Catalog with the filters from the query string.
    Games(GameListParams),
    GameDetail(GameId),
    Login,
    Signup,
    UserDashboard,
    Admin(AdminSection),
    NotFound(String),
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Allow,
    /// Send the user to `to`, remembering `from` for after login.
    Redirect { to: Route, from: Route },
}

impl Route {
    /// Parse a URL path. Trailing slashes and fragments are ignored, and the
    /// query string only matters for the catalog. Anything unrecognized is
    /// `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.split('#').next().unwrap_or("");
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["games"] => Route::Games(catalog_filters(query)),
            ["games", id] => Route::GameDetail(GameId::new(*id)),
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["user", "dashboard"] => Route::UserDashboard,
            ["admin"] => Route::Admin(AdminSection::Overview),
            ["admin", section] => AdminSection::from_segment(section)
                .map(Route::Admin)
                .unwrap_or_else(|| Route::NotFound(path.to_string())),
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Games(filters) => {
                let pairs = filters.pairs();
                if pairs.is_empty() {
                    "/games".to_string()
                } else {
                    let query = form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(pairs)
                        .finish();
                    format!("/games?{}", query)
                }
            }
            Route::GameDetail(id) => format!("/games/{}", id),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::UserDashboard => "/user/dashboard".to_string(),
            Route::Admin(section) => match section.segment() {
                Some(segment) => format!("/admin/{}", segment),
                None => "/admin".to_string(),
            },
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Games(_) => "Games",
            Route::GameDetail(_) => "Game",
            Route::Login => "Login",
            Route::Signup => "Sign up",
            Route::UserDashboard => "Dashboard",
            Route::Admin(AdminSection::Overview) => "Admin",
            Route::Admin(AdminSection::Games) => "Manage games",
            Route::Admin(AdminSection::Members) => "Manage members",
            Route::Admin(AdminSection::Products) => "Manage products",
            Route::Admin(AdminSection::Transactions) => "Transactions",
            Route::Admin(AdminSection::Recharges) => "Recharges",
            Route::NotFound(_) => "Not found",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::UserDashboard => Access::Authenticated,
            Route::Admin(_) => Access::Admin,
            _ => Access::Public,
        }
    }

    /// Landing route after login.
    pub fn home_for(role: Role) -> Route {
        Route::parse(role.home_path())
    }

    pub fn guard(&self, identity: Option<&Identity>) -> Guard {
        let allowed = match (self.access(), identity) {
            (Access::Public, _) => true,
            (Access::Authenticated, Some(_)) => true,
            (Access::Admin, Some(identity)) => identity.is_admin(),
            (_, None) => false,
        };
        if allowed {
            Guard::Allow
        } else {
            Guard::Redirect {
                to: Route::Login,
                from: self.clone(),
            }
        }
    }
}

/// Catalog filters from a query string (`genre=RPG&page=2`), percent- and
/// plus-decoded. Unknown keys, empty values and unparseable numbers are
/// ignored.
pub fn catalog_filters(query: &str) -> GameListParams {
    let query = query.trim_start_matches('?');
    let mut params = GameListParams::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.trim().is_empty() {
            continue;
        }
        match key.as_ref() {
            "page" => params.page = value.parse().ok().or(params.page),
            "size" => params.size = value.parse().ok().or(params.size),
            "genre" => params.genre = Some(value.into_owned()),
            "platform" => params.platform = Some(value.into_owned()),
            "search" => params.search = Some(value.into_owned()),
            _ => {}
        }
    }
    params
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamezone_core::MemberId;
    use proptest::prelude::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: "1".into(),
            name: "N".into(),
            email: "n@zone.gg".into(),
            role,
            member_id: (role == Role::User).then(|| MemberId::new("1")),
            phone_number: None,
            token: None,
        }
    }

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/games/"), Route::Games(GameListParams::new()));
        assert_eq!(Route::parse("/games/g1"), Route::GameDetail(GameId::new("g1")));
        assert_eq!(Route::parse("/user/dashboard"), Route::UserDashboard);
        assert_eq!(Route::parse("/admin"), Route::Admin(AdminSection::Overview));
        assert_eq!(Route::parse("/admin/recharges?x=1"), Route::Admin(AdminSection::Recharges));
    }

    #[test]
    fn test_parse_unknown_is_not_found() {
        assert!(matches!(Route::parse("/admin/secrets"), Route::NotFound(_)));
        assert!(matches!(Route::parse("/games/g1/edit"), Route::NotFound(_)));
        assert!(matches!(Route::parse("/nope"), Route::NotFound(_)));
    }

    #[test]
    fn test_catalog_query_becomes_filters() {
        let route = Route::parse("/games?genre=RPG&page=2&size=x&search=space%20race&bogus=1");
        let Route::Games(filters) = &route else {
            panic!("expected catalog, got {:?}", route);
        };
        assert_eq!(filters.genre.as_deref(), Some("RPG"));
        assert_eq!(filters.page, Some(2));
        assert_eq!(filters.size, None);
        assert_eq!(filters.search.as_deref(), Some("space race"));
        assert_eq!(catalog_filters("search=space+race").search.as_deref(), Some("space race"));
        assert_eq!(catalog_filters(""), GameListParams::new());
    }

    #[test]
    fn test_catalog_path_keeps_filters() {
        let route = Route::Games(GameListParams::new().with_genre("Role Play").with_page(3));
        assert_eq!(route.path(), "/games?page=3&genre=Role+Play");
        assert_eq!(Route::parse(&route.path()), route);
        assert_eq!(Route::Games(GameListParams::new()).path(), "/games");
    }

    #[test]
    fn test_role_homes() {
        assert_eq!(Route::home_for(Role::Admin), Route::Admin(AdminSection::Overview));
        assert_eq!(Route::home_for(Role::User), Route::UserDashboard);
    }

    #[test]
    fn test_guards() {
        let admin = identity(Role::Admin);
        let user = identity(Role::User);

        assert_eq!(Route::Games(GameListParams::new()).guard(None), Guard::Allow);
        assert_eq!(Route::UserDashboard.guard(Some(&user)), Guard::Allow);
        assert_eq!(Route::UserDashboard.guard(Some(&admin)), Guard::Allow);
        assert_eq!(
            Route::UserDashboard.guard(None),
            Guard::Redirect {
                to: Route::Login,
                from: Route::UserDashboard
            }
        );

        let admin_games = Route::Admin(AdminSection::Games);
        assert_eq!(admin_games.guard(Some(&admin)), Guard::Allow);
        assert!(matches!(admin_games.guard(Some(&user)), Guard::Redirect { .. }));
    }

    proptest! {
        #[test]
        fn known_routes_roundtrip_through_path(
            id in "[a-z0-9]{1,10}",
            idx in 0usize..6,
            genre in proptest::option::of("[A-Za-z &]{1,10}"),
        ) {
            let filters = GameListParams {
                genre: genre.filter(|g| !g.trim().is_empty()),
                ..GameListParams::default()
            };
            let routes = [
                Route::Home,
                Route::Games(filters),
                Route::GameDetail(GameId::new(id)),
                Route::Login,
                Route::UserDashboard,
                Route::Admin(AdminSection::all()[idx]),
            ];
            for route in routes {
                prop_assert_eq!(Route::parse(&route.path()), route);
            }
        }
    }
}
