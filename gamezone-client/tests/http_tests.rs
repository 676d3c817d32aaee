//! HTTP wrapper behaviour against a mock backend.

use gamezone_client::{ApiRequest, SessionEvent, SessionPhase};
use gamezone_core::{ApiError, Game, GameForm, GameListParams, RetryConfig};
use gamezone_test_utils::assertions::{assert_auth_expired, assert_status};
use gamezone_test_utils::backend::{hits, mount_json};
use gamezone_test_utils::fixtures::{
    game_json, logged_in_context, member_identity, test_config, test_context,
};
use gamezone_test_utils::{ClientContext, MemoryStorage};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_idempotent_get_retries_5xx_then_surfaces_error() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/games", 503, json!({"message": "down"})).await;
    let (ctx, _) = test_context(&server.uri());

    let result = ctx.api.games().list(&GameListParams::new()).await;

    assert_status(&result, 503);
    assert_eq!(hits(&server, "GET", "/games").await, 4);
    match result {
        Err(ApiError::Http { message, .. }) => assert_eq!(message, "down"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/g1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_json(&server, "GET", "/games/g1", 200, game_json("g1", "Neon Drift", 4.99)).await;
    let (ctx, _) = test_context(&server.uri());

    let game = ctx.api.games().get(&"g1".into()).await.unwrap();

    assert_eq!(game.name, "Neon Drift");
    assert_eq!(hits(&server, "GET", "/games/g1").await, 3);
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let server = MockServer::start().await;
    mount_json(&server, "POST", "/games", 502, json!({})).await;
    let (ctx, _) = test_context(&server.uri());

    let form = GameForm {
        name: "New".into(),
        price: 1.0,
        ..GameForm::default()
    };
    let result = ctx.api.games().create(&form).await;

    assert_status(&result, 502);
    assert_eq!(hits(&server, "POST", "/games").await, 1);
}

#[tokio::test]
async fn test_4xx_is_not_retried_and_field_errors_normalized() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "POST",
        "/members",
        400,
        json!({
            "message": "Validation failed",
            "errors": [{"field": "email", "defaultMessage": "must be a well-formed email address"}]
        }),
    )
    .await;
    let (ctx, _) = test_context(&server.uri());

    let err = ctx
        .api
        .members()
        .create(&Default::default())
        .await
        .unwrap_err();

    let normalized = err.normalized();
    assert_eq!(normalized.status_code, 400);
    assert_eq!(normalized.message, "Validation failed");
    assert_eq!(normalized.field_errors.len(), 1);
    assert_eq!(normalized.field_errors[0].field.as_deref(), Some("email"));
    assert_eq!(hits(&server, "POST", "/members").await, 1);
}

#[tokio::test]
async fn test_list_filters_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("genre", "RPG"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let (ctx, _) = test_context(&server.uri());

    let params = GameListParams::new().with_genre("RPG").with_page(2);
    let games: Vec<Game> = ctx.api.games().list(&params).await.unwrap();
    assert!(games.is_empty());
}

#[tokio::test]
async fn test_bearer_attached_only_with_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/members"))
        .and(header("authorization", "Bearer tok-member"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Forbidden"})))
        .mount(&server)
        .await;

    let (anonymous, _) = test_context(&server.uri());
    assert_status(&anonymous.api.members().list().await, 403);

    let (member, _) = logged_in_context(&server.uri(), member_identity("m1"));
    assert!(member.api.members().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let (ctx, _) = test_context(&server.uri());

    let err = ctx.api.games().list(&GameListParams::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse { status_code: 200, .. }));
    assert_eq!(hits(&server, "GET", "/games").await, 1);
}

#[tokio::test]
async fn test_timeout_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let mut config = test_config(&server.uri());
    config.request_timeout_ms = 100;
    config.retry = RetryConfig::disabled();
    let ctx = ClientContext::with_storage(config, Arc::new(MemoryStorage::new())).unwrap();

    let err = ctx.api.health().health().await.unwrap_err();
    assert_eq!(err, ApiError::Timeout { timeout_ms: 100 });
    assert_eq!(err.normalized().status_code, 0);
}

#[tokio::test]
async fn test_network_error_when_backend_unreachable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    let mut config = test_config(&uri);
    config.retry = RetryConfig::disabled();
    let ctx = ClientContext::with_storage(config, Arc::new(MemoryStorage::new())).unwrap();

    let err = ctx.api.health().health().await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_concurrent_401s_expire_session_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;
    let (ctx, storage) = logged_in_context(&server.uri(), member_identity("m1"));
    let mut events = ctx.session.subscribe();
    let client = ctx.api.transactions();

    let (a, b, c) = tokio::join!(client.list(), client.list(), client.list());
    assert_auth_expired(&a);
    assert_auth_expired(&b);
    assert_auth_expired(&c);

    assert_eq!(ctx.session.phase(), SessionPhase::Anonymous);
    assert!(storage.is_empty());
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Expired {
            redirect_to: "/login".into()
        }
    );
    assert!(events.try_recv().is_err());
    // 401 is not transient: one request each, no retries.
    assert_eq!(hits(&server, "GET", "/transactions").await, 3);
}

#[tokio::test]
async fn test_login_401_does_not_trigger_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"success": false, "message": "Invalid username"})),
        )
        .mount(&server)
        .await;
    let (ctx, _) = logged_in_context(&server.uri(), member_identity("m1"));

    let request = ApiRequest::post("/admin/login")
        .with_json(&json!({"username": "nobody"}))
        .unwrap()
        .without_auth_expiry();
    let err = ctx.http.send(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::Http { status_code: 401, .. }));
    assert!(ctx.session.is_authenticated());
}
