//! API integration tests.
//!
//! These drive the full router, including the session middleware, against
//! a mock database. Each mock is loaded with the exact query results the
//! request will consume, in order; the first result is always the token
//! lookup when an `Authorization` header is sent.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    response::Response,
};
use dailyflip_api::{
    middleware::{AppState, auth_middleware},
    router as api_router,
};
use dailyflip_common::config::FeedConfig;
use dailyflip_core::{CommentService, FeedService, FriendshipService, PostService, UserService};
use dailyflip_db::{
    entities::{
        friendship::{self, FriendshipStatus},
        user,
    },
    repositories::{
        CommentRepository, FriendshipRepository, PostRepository, ProfileRepository,
        UserRepository,
    },
    test_utils::fixtures,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Create test app state over the given database.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let friendship_repo = FriendshipRepository::new(Arc::clone(&db));

    AppState {
        user_service: UserService::new(user_repo.clone(), profile_repo),
        friendship_service: FriendshipService::new(friendship_repo, user_repo.clone()),
        feed_service: FeedService::new(post_repo.clone(), comment_repo.clone(), user_repo.clone()),
        post_service: PostService::new(post_repo.clone(), user_repo),
        comment_service: CommentService::new(comment_repo, post_repo),
        feed: FeedConfig::default(),
    }
}

/// Create the test router, wired like the server binary.
fn create_test_router(db: MockDatabase) -> Router {
    let state = create_test_state(db.into_connection());
    Router::new()
        .nest("/api", api_router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn mock() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// Mock whose first query resolves the bearer token to `user`.
fn signed_in_as(user: &user::Model) -> MockDatabase {
    mock().append_query_results([[user.clone()]])
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn deleted(rows: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: rows,
    }
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(mock());

    let response = app
        .oneshot(request("GET", "/api/nonexistent", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_friends_without_session_is_unauthorized() {
    let app = create_test_router(mock());

    let response = app
        .oneshot(request("GET", "/api/friends", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_stale_token_is_unauthorized() {
    let app = create_test_router(mock().append_query_results([Vec::<user::Model>::new()]));

    let response = app
        .oneshot(request("GET", "/api/posts", Some("stale"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_returns_created() {
    let created = fixtures::user("user1", "Alice");
    let db = mock()
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([[created]])
        .append_query_results([[fixtures::profile("user1")]]);
    let app = create_test_router(db);

    let body = serde_json::json!({
        "name": "Alice",
        "email": "alice@example.com",
        "password": "correct horse",
    });
    let response = app
        .oneshot(request("POST", "/api/register", None, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["id"], "user1");
}

#[tokio::test]
async fn test_register_invalid_email_is_bad_request() {
    let app = create_test_router(mock());

    let body = serde_json::json!({
        "name": "Alice",
        "email": "not-an-email",
        "password": "correct horse",
    });
    let response = app
        .oneshot(request("POST", "/api/register", None, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_signin_unknown_email_is_unauthorized() {
    let app = create_test_router(mock().append_query_results([Vec::<user::Model>::new()]));

    let body = serde_json::json!({ "email": "nobody@example.com", "password": "whatever1" });
    let response = app
        .oneshot(request("POST", "/api/signin", None, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_session_identity() {
    let alice = fixtures::user("alice", "Alice");
    let app = create_test_router(signed_in_as(&alice));

    let response = app
        .oneshot(request("GET", "/api/users/me", Some("token-alice"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["id"], "alice");
    assert_eq!(body["data"]["role"], "MEMBER");
    assert!(body["data"].get("token").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_friend_request_created() {
    let alice = fixtures::user("alice", "Alice");
    let row = fixtures::friendship("f1", "alice", "bob", FriendshipStatus::Pending);
    let db = signed_in_as(&alice)
        .append_query_results([[fixtures::user("bob", "Bob")]])
        .append_query_results([Vec::<friendship::Model>::new()])
        .append_query_results([[row]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/friends",
            Some("token-alice"),
            Some(serde_json::json!({ "friendId": "bob" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["requesterId"], "alice");
    assert_eq!(body["data"]["recipientId"], "bob");
    assert_eq!(body["data"]["status"], "PENDING");
}

#[tokio::test]
async fn test_reverse_friend_request_conflicts() {
    let bob = fixtures::user("bob", "Bob");
    let existing = fixtures::friendship("f1", "alice", "bob", FriendshipStatus::Pending);
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::user("alice", "Alice")]])
        .append_query_results([[existing]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/friends",
            Some("token-bob"),
            Some(serde_json::json!({ "friendId": "alice" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_friend_action_is_bad_request() {
    let bob = fixtures::user("bob", "Bob");
    let app = create_test_router(signed_in_as(&bob));

    let response = app
        .oneshot(request(
            "PATCH",
            "/api/friends/f1",
            Some("token-bob"),
            Some(serde_json::json!({ "action": "block" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requester_cannot_accept_own_request() {
    let alice = fixtures::user("alice", "Alice");
    let db = signed_in_as(&alice)
        .append_query_results([Vec::<friendship::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "PATCH",
            "/api/friends/f1",
            Some("token-alice"),
            Some(serde_json::json!({ "action": "accept" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipient_accepts_request() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::friendship(
            "f1",
            "alice",
            "bob",
            FriendshipStatus::Pending,
        )]])
        .append_query_results([[fixtures::friendship(
            "f1",
            "alice",
            "bob",
            FriendshipStatus::Accepted,
        )]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "PATCH",
            "/api/friends/f1",
            Some("token-bob"),
            Some(serde_json::json!({ "action": "accept" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ACCEPTED");
}

#[tokio::test]
async fn test_friend_list_shows_counterpart() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::friendship(
            "f1",
            "alice",
            "bob",
            FriendshipStatus::Accepted,
        )]])
        .append_query_results([[fixtures::user("alice", "Alice")]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/friends", Some("token-bob"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let friends = body["data"].as_array().unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0]["id"], "alice");
    assert_eq!(friends[0]["friendshipId"], "f1");
}

#[tokio::test]
async fn test_global_feed_shape() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::post("p1", "alice", "hello", false)]])
        .append_query_results([[fixtures::user("alice", "Alice")]])
        .append_query_results([[fixtures::comment("c1", "bob", "p1", "hi alice")]])
        .append_query_results([[fixtures::user("bob", "Bob")]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/posts?limit=5", Some("token-bob"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let post = &body["data"][0];
    assert_eq!(post["id"], "p1");
    assert_eq!(post["isPrivate"], false);
    assert_eq!(post["user"]["name"], "Alice");
    assert_eq!(post["comments"][0]["user"]["id"], "bob");
    assert!(post["comments"][0]["user"].get("email").is_none());
}

#[tokio::test]
async fn test_admin_deletes_any_post() {
    let admin = fixtures::admin("admin1", "Root");
    let db = signed_in_as(&admin)
        .append_query_results([[fixtures::post("p1", "alice", "hello", false)]])
        .append_query_results([[admin.clone()]])
        .append_exec_results([deleted(1), deleted(1)]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("DELETE", "/api/posts/p1", Some("token-admin1"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_member_cannot_delete_others_post() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::post("p1", "alice", "hello", false)]])
        .append_query_results([[bob.clone()]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("DELETE", "/api/posts/p1", Some("token-bob"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_comment_on_hidden_post_is_not_found() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::post("p1", "alice", "secret", true)]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/comments",
            Some("token-bob"),
            Some(serde_json::json!({ "postId": "p1", "content": "peek" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn test_comment_created() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_results([[fixtures::post("p1", "alice", "hello", false)]])
        .append_query_results([[fixtures::post("p1", "alice", "hello", false)]])
        .append_query_results([[fixtures::comment("c1", "bob", "p1", "nice")]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/comments",
            Some("token-bob"),
            Some(serde_json::json!({ "postId": "p1", "content": "nice" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["postId"], "p1");
}

#[tokio::test]
async fn test_profile_feed_for_unknown_user() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob).append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/users/ghost/posts", Some("token-bob"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_database_error_is_opaque() {
    let bob = fixtures::user("bob", "Bob");
    let db = signed_in_as(&bob)
        .append_query_errors([sea_orm::DbErr::Custom("relation missing".to_string())]);
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/posts", Some("token-bob"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Something went wrong");
}
