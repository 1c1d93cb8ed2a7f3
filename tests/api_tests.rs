// tests/api_tests.rs

mod common;

use common::{ADMIN_EMAIL, PASSWORD, spawn_app, test_config, test_pool, unique_email};
use qcm_server::seed::seed;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn unknown_path_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_works() {
    let app = spawn_app().await;
    let email = unique_email();

    let response = app.register(&email).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let user: Value = response.json().await.unwrap();
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["role"], "people");
    assert_eq!(user["is_active"], true);
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    let bodies = [
        // Password too short
        json!({
            "email": unique_email(), "password": "short", "confirm_password": "short",
            "first_name": "Jane", "last_name": "Doe"
        }),
        // Passwords differ
        json!({
            "email": unique_email(), "password": PASSWORD, "confirm_password": "password124",
            "first_name": "Jane", "last_name": "Doe"
        }),
        // Missing names
        json!({
            "email": unique_email(), "password": PASSWORD, "confirm_password": PASSWORD,
            "first_name": "", "last_name": ""
        }),
        // Not an email
        json!({
            "email": "not-an-email", "password": PASSWORD, "confirm_password": PASSWORD,
            "first_name": "Jane", "last_name": "Doe"
        }),
    ];

    for body in bodies {
        let response = app
            .client
            .post(app.url("/api/auth/register"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = spawn_app().await;
    let email = unique_email();

    assert_eq!(app.register(&email).await.status(), StatusCode::CREATED);
    assert_eq!(app.register(&email).await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;
    let email = unique_email();
    app.register(&email).await;

    let wrong_password = app.login(&email, "wrong-password").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown = app.login("nobody@example.com", PASSWORD).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_token_and_records_last_login() {
    let app = spawn_app().await;
    let email = unique_email();
    app.register(&email).await;

    let response = app.login(&email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["type"], "Bearer");
    assert_eq!(body["role"], "people");

    let token = body["token"].as_str().unwrap();
    let me: Value = app.get("/api/auth/me", token).await.json().await.unwrap();
    assert_eq!(me["email"], email.as_str());
    assert!(!me["last_login"].is_null());
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = spawn_app().await;

    let me = app.client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let quizzes = app.get("/api/qcm", "garbage-token").await;
    assert_eq!(quizzes.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_forbidden_for_people() {
    let app = spawn_app().await;
    let token = app.user_token().await;

    assert_eq!(app.get("/api/admin/users", &token).await.status(), StatusCode::FORBIDDEN);

    let create = app
        .post("/api/admin/qcms", &token, &json!({ "title": "Sneaky", "questions": [] }))
        .await;
    assert_eq!(create.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_users_and_roles() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    app.user_token().await;

    let response = app.get("/api/admin/users", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    let roles: Vec<&str> = body["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["admin", "people"]);
}

#[tokio::test]
async fn deactivated_user_cannot_login() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let email = unique_email();
    let user: Value = app.register(&email).await.json().await.unwrap();
    let user_id = user["id"].as_i64().unwrap();

    let toggle = app
        .post(&format!("/api/admin/users/{}/toggle-status", user_id), &admin, &json!({}))
        .await;
    assert_eq!(toggle.status(), StatusCode::OK);
    let body: Value = toggle.json().await.unwrap();
    assert_eq!(body["is_active"], false);

    assert_eq!(app.login(&email, PASSWORD).await.status(), StatusCode::FORBIDDEN);

    // Reactivate
    app.post(&format!("/api/admin/users/{}/toggle-status", user_id), &admin, &json!({}))
        .await;
    assert_eq!(app.login(&email, PASSWORD).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_cannot_target_own_account() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let me: Value = app.get("/api/auth/me", &admin).await.json().await.unwrap();
    let admin_id = me["id"].as_i64().unwrap();

    let delete = app.delete(&format!("/api/admin/users/{}", admin_id), &admin).await;
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);

    let toggle = app
        .post(&format!("/api/admin/users/{}/toggle-status", admin_id), &admin, &json!({}))
        .await;
    assert_eq!(toggle.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_deletes_user() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let email = unique_email();
    let user: Value = app.register(&email).await.json().await.unwrap();
    let user_id = user["id"].as_i64().unwrap();

    let path = format!("/api/admin/users/{}", user_id);
    assert_eq!(app.delete(&path, &admin).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&path, &admin).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.login(&email, PASSWORD).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let pool = test_pool().await;
    let config = test_config();

    seed(&pool, config.admin.as_ref()).await.unwrap();
    seed(&pool, config.admin.as_ref()).await.unwrap();

    let (roles,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(roles, 2);

    let (admins,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(ADMIN_EMAIL)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 1);
}

#[tokio::test]
async fn seeding_without_admin_creates_roles_only() {
    let pool = test_pool().await;

    seed(&pool, None).await.unwrap();

    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}
