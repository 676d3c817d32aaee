//! Application shell against a mock backend.

use gamezone_app::nav::{AdminSection, Route};
use gamezone_app::views::{GameDetailView, LoginTab, RechargeForm, SignupForm, ViewModel};
use gamezone_app::App;
use gamezone_core::{Credentials, GameId, GameListParams};
use gamezone_test_utils::backend::{
    hits, mount_admin_login, mount_games, mount_health, mount_json, mount_member_login,
};
use gamezone_test_utils::fixtures::{
    admin_stats_json, game_json, logged_in_context, member_identity, test_context,
    transaction_json, user_dashboard_json,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> App {
    App::new(test_context(&server.uri()).0)
}

#[tokio::test]
async fn test_home_shows_four_featured_games_and_health() {
    let server = MockServer::start().await;
    mount_games(&server).await;
    mount_health(&server).await;
    let mut app = app_for(&server);

    app.navigate("/");
    match app.load_current().await {
        ViewModel::Home(home) => {
            assert_eq!(home.featured.len(), 4);
            assert!(home.backend_up);
            assert!(home.error.is_none());
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_catalog_falls_back_to_empty_on_failure() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/games", 404, json!({"message": "missing"})).await;
    let mut app = app_for(&server);

    app.navigate("/games");
    match app.load_current().await {
        ViewModel::Games(view) => {
            assert!(view.games.is_empty());
            assert_eq!(view.error.unwrap().status_code, 404);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_catalog_route_sends_its_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("genre", "RPG"))
        .and(query_param("search", "space race"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gamezone_test_utils::fixtures::games_json()),
        )
        .mount(&server)
        .await;
    let mut app = app_for(&server);

    let route = app.navigate("/games?genre=RPG&search=space%20race").clone();
    assert_eq!(
        route,
        Route::Games(GameListParams::new().with_genre("RPG").with_search("space race"))
    );
    match app.load_current().await {
        ViewModel::Games(view) => {
            assert_eq!(view.filters.genre.as_deref(), Some("RPG"));
            assert_eq!(view.games.len(), 5);
            assert!(view.error.is_none());
        }
        other => panic!("unexpected view: {:?}", other),
    }
    assert_eq!(hits(&server, "GET", "/games").await, 1);
}

#[tokio::test]
async fn test_guarded_route_redirects_then_resumes_after_login() {
    let server = MockServer::start().await;
    mount_admin_login(&server).await;
    mount_json(&server, "GET", "/dashboard/admin/stats", 200, admin_stats_json()).await;
    let mut app = app_for(&server);

    assert_eq!(app.navigate("/admin"), &Route::Login);
    match app.load_current().await {
        ViewModel::Login(form) => {
            assert_eq!(form.redirect_to, Some(Route::Admin(AdminSection::Overview)))
        }
        other => panic!("unexpected view: {:?}", other),
    }

    assert!(app.login(&Credentials::admin("admin")).await);
    assert_eq!(app.route(), &Route::Admin(AdminSection::Overview));
    match app.load_current().await {
        ViewModel::AdminDashboard(view) => assert_eq!(view.stats.total_members, 12),
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_member_cannot_open_admin_routes() {
    let server = MockServer::start().await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));
    let mut app = App::new(ctx);

    assert_eq!(app.navigate("/admin/members"), &Route::Login);
    assert_eq!(hits(&server, "GET", "/members").await, 0);
}

#[tokio::test]
async fn test_member_login_lands_on_user_dashboard() {
    let server = MockServer::start().await;
    mount_member_login(&server, "m1").await;
    mount_json(&server, "GET", "/dashboard/user/m1", 200, user_dashboard_json("m1")).await;
    let mut app = app_for(&server);

    assert!(app.login(&Credentials::member("ana@zone.gg")).await);
    assert_eq!(app.route(), &Route::UserDashboard);
    match app.load_current().await {
        ViewModel::UserDashboard(view) => {
            assert_eq!(view.dashboard.total_recharged, 25.0);
            assert_eq!(view.dashboard.transactions.len(), 1);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_login_notifies_and_stays_put() {
    let server = MockServer::start().await;
    mount_json(&server, "POST", "/members/login", 401, json!({"success": false})).await;
    let mut app = app_for(&server);
    app.navigate("/login");

    assert!(!app.login(&Credentials::member("unknown@x.com")).await);
    assert_eq!(app.route(), &Route::Login);
    assert!(app.identity().is_none());
    assert_eq!(app.notifications.latest().unwrap().title, "Login failed");
}

#[tokio::test]
async fn test_expired_session_redirects_to_login_once() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/dashboard/user/m1", 401, json!({})).await;
    let (ctx, storage) = logged_in_context(&server.uri(), member_identity("m1"));
    let mut app = App::new(ctx);

    assert_eq!(app.navigate("/user/dashboard"), &Route::UserDashboard);
    match app.load_current().await {
        ViewModel::Login(form) => assert_eq!(form.redirect_to, Some(Route::UserDashboard)),
        other => panic!("unexpected view: {:?}", other),
    }
    assert_eq!(app.route(), &Route::Login);
    assert!(storage.is_empty());

    let expired = app
        .notifications
        .iter()
        .filter(|n| n.title == "Session expired")
        .count();
    assert_eq!(expired, 1);
    assert_eq!(app.handle_session_events(), 0);
}

#[tokio::test]
async fn test_game_detail_hides_expired_session() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/games/g1", 401, json!({"message": "Unauthorized"})).await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));
    let identity = ctx.session.current();

    let view = GameDetailView::load(&ctx.queries, &GameId::new("g1"), identity.as_ref()).await;
    assert!(view.game.is_none());
    assert!(view.error.is_none());
    assert!(!view.can_purchase);
    assert!(ctx.session.current().is_none());
}

#[tokio::test]
async fn test_actions_hide_expired_session() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/dashboard/user/m1", 200, user_dashboard_json("m1")).await;
    mount_json(&server, "POST", "/recharges", 401, json!({})).await;
    mount_json(&server, "POST", "/members", 401, json!({})).await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));
    let identity = ctx.session.current();

    let view = gamezone_app::views::UserDashboardView::load(&ctx.queries, identity.as_ref()).await;
    let err = view
        .recharge(&ctx.queries, &RechargeForm::new(10.0, "CARD"))
        .await
        .unwrap_err();
    assert!(!err.is_shown());
    assert!(err.message.is_empty());

    let mut signup = SignupForm::new();
    signup.form.name = "Bo".into();
    signup.form.email = "bo@zone.gg".into();
    signup.form.phone_number = "555".into();
    assert!(signup.submit(&ctx.queries).await.is_err());
    assert!(signup.error.is_none());
}

#[tokio::test]
async fn test_user_dashboard_zero_state_on_failure() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/dashboard/user/m1", 500, json!({})).await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));
    let mut app = App::new(ctx);

    app.navigate("/user/dashboard");
    match app.load_current().await {
        ViewModel::UserDashboard(view) => {
            assert_eq!(view.balance(), 0.0);
            assert!(view.dashboard.games.is_empty());
            assert_eq!(view.error.unwrap().status_code, 500);
        }
        other => panic!("unexpected view: {:?}", other),
    }
    // Idempotent read: retried three times after the first attempt.
    assert_eq!(hits(&server, "GET", "/dashboard/user/m1").await, 4);
}

#[tokio::test]
async fn test_game_detail_purchase_refreshes_dashboard() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/games/g1", 200, game_json("g1", "Neon Drift", 4.99)).await;
    mount_json(&server, "GET", "/dashboard/user/m1", 200, user_dashboard_json("m1")).await;
    mount_json(&server, "POST", "/transactions", 201, transaction_json("t2", "m1", "g1", 4.99)).await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));
    let mut app = App::new(ctx);

    app.navigate("/user/dashboard");
    app.load_current().await;
    app.navigate("/user/dashboard");
    app.load_current().await;
    assert_eq!(hits(&server, "GET", "/dashboard/user/m1").await, 1);

    app.navigate("/games/g1");
    let detail = match app.load_current().await {
        ViewModel::GameDetail(view) => view,
        other => panic!("unexpected view: {:?}", other),
    };
    assert!(detail.can_purchase);
    let identity = app.identity();
    let receipt = detail
        .purchase(&app.ctx.queries, identity.as_ref())
        .await
        .unwrap();
    assert_eq!(receipt.game_id, GameId::new("g1"));

    app.navigate("/user/dashboard");
    app.load_current().await;
    assert_eq!(hits(&server, "GET", "/dashboard/user/m1").await, 2);
}

#[tokio::test]
async fn test_admin_cannot_purchase() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/games/g1", 200, game_json("g1", "Neon Drift", 4.99)).await;
    mount_admin_login(&server).await;
    let mut app = app_for(&server);
    assert!(app.login(&Credentials::admin("admin")).await);

    app.navigate("/games/g1");
    let detail = match app.load_current().await {
        ViewModel::GameDetail(view) => view,
        other => panic!("unexpected view: {:?}", other),
    };
    assert!(!detail.can_purchase);
    let identity = app.identity();
    assert!(detail.purchase(&app.ctx.queries, identity.as_ref()).await.is_err());
    assert_eq!(hits(&server, "POST", "/transactions").await, 0);
}

#[tokio::test]
async fn test_recharge_validation_blocks_request() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/dashboard/user/m1", 200, user_dashboard_json("m1")).await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));
    let mut app = App::new(ctx);

    app.navigate("/user/dashboard");
    let view = match app.load_current().await {
        ViewModel::UserDashboard(view) => view,
        other => panic!("unexpected view: {:?}", other),
    };
    let err = view
        .recharge(&app.ctx.queries, &RechargeForm::new(0.0, ""))
        .await
        .unwrap_err();
    assert_eq!(err.field_errors.len(), 2);
    assert_eq!(hits(&server, "POST", "/recharges").await, 0);
}

#[tokio::test]
async fn test_signup_validates_locally_then_creates() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "POST",
        "/members",
        201,
        json!({"id": "m5", "name": "Bo", "email": "bo@zone.gg", "phoneNumber": "555"}),
    )
    .await;
    let (ctx, _) = test_context(&server.uri());

    let mut form = SignupForm::new();
    form.form.email = "bo-at-zone".into();
    let err = form.submit(&ctx.queries).await.unwrap_err();
    assert_eq!(err.for_field("email"), Some("Email must contain @"));
    assert_eq!(hits(&server, "POST", "/members").await, 0);

    form.form.name = "Bo".into();
    form.form.email = "bo@zone.gg".into();
    form.form.phone_number = "555".into();
    let member = form.submit(&ctx.queries).await.unwrap();
    assert_eq!(member.id.as_str(), "m5");
    assert!(form.error.is_none());
}

#[tokio::test]
async fn test_admin_sections_and_logout() {
    let server = MockServer::start().await;
    mount_admin_login(&server).await;
    mount_json(&server, "GET", "/recharges", 200, json!([])).await;
    let mut app = app_for(&server);
    assert!(app.login(&Credentials::admin("admin")).await);

    app.navigate("/admin/recharges");
    match app.load_current().await {
        ViewModel::AdminSection(view) => assert!(view.items.is_empty()),
        other => panic!("unexpected view: {:?}", other),
    }
    assert!(!app.ctx.cache().is_empty());

    app.logout();
    assert!(app.identity().is_none());
    assert!(app.ctx.cache().is_empty());
    assert_eq!(app.route(), &Route::Home);
    assert_eq!(app.navigate("/admin/recharges"), &Route::Login);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = MockServer::start().await;
    let mut app = app_for(&server);
    app.navigate("/arcade");
    match app.load_current().await {
        ViewModel::NotFound { path } => assert_eq!(path, "/arcade"),
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_navigation_discards_late_view_work() {
    let server = MockServer::start().await;
    let mut app = app_for(&server);
    app.navigate("/games");

    let handle = app.view_handle();
    let (release, wait) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        handle
            .run(async move {
                let _ = wait.await;
                "catalog"
            })
            .await
    });

    app.navigate("/signup");
    assert!(app.view_handle().is_alive());
    release.send(()).unwrap();
    assert_eq!(task.await.unwrap(), None);
}

#[test]
fn test_login_tab_default_is_member() {
    let form = gamezone_app::views::LoginForm::new(None);
    assert_eq!(form.tab, LoginTab::Member);
}
