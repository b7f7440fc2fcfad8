//! Integration tests for the user API.

use recipe_integration_tests::{TEST_PASSWORD, TestContext, send};
use serde_json::json;

const CREATE_USER_URL: &str = "/user/create/";
const TOKEN_URL: &str = "/user/token/";
const ME_URL: &str = "/user/me/";

#[tokio::test]
async fn test_create_valid_user_success() {
    let ctx = TestContext::new().await;

    let payload = json!({
        "email": "Test@EXAMPLE.com",
        "password": "testpass",
        "name": "Test Name",
    });
    let (status, body) = send(ctx.client.post(ctx.url(CREATE_USER_URL)).json(&payload)).await;

    assert_eq!(status, 201);
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["name"], "Test Name");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_user_exists() {
    let ctx = TestContext::new().await;
    ctx.create_user("test@example.com").await;

    let payload = json!({
        "email": "TEST@example.com",
        "password": "testpass",
    });
    let (status, body) = send(ctx.client.post(ctx.url(CREATE_USER_URL)).json(&payload)).await;
    assert_eq!(status, 400);
    assert!(body["detail"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_password_too_short() {
    let ctx = TestContext::new().await;

    let payload = json!({
        "email": "test@example.com",
        "password": "pw",
    });
    let (status, _) = send(ctx.client.post(ctx.url(CREATE_USER_URL)).json(&payload)).await;
    assert_eq!(status, 400);

    // Nothing was created: the password still cannot log in.
    let payload = json!({
        "email": "test@example.com",
        "password": "pw",
    });
    let (status, _) = send(ctx.client.post(ctx.url(TOKEN_URL)).json(&payload)).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_create_user_without_email() {
    let ctx = TestContext::new().await;

    let payload = json!({
        "email": "",
        "password": "testpass",
    });
    let (status, _) = send(ctx.client.post(ctx.url(CREATE_USER_URL)).json(&payload)).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_create_token_for_user() {
    let ctx = TestContext::new().await;
    ctx.create_user("test@example.com").await;

    let payload = json!({
        "email": "test@example.com",
        "password": TEST_PASSWORD,
    });
    let (status, body) = send(ctx.client.post(ctx.url(TOKEN_URL)).json(&payload)).await;
    assert_eq!(status, 200);
    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 40);

    // Logging in again returns the same token.
    let payload = json!({
        "email": "TEST@example.com",
        "password": TEST_PASSWORD,
    });
    let (_, again) = send(ctx.client.post(ctx.url(TOKEN_URL)).json(&payload)).await;
    assert_eq!(again["token"], token);
}

#[tokio::test]
async fn test_create_token_bad_credentials() {
    let ctx = TestContext::new().await;
    ctx.create_user("test@example.com").await;

    for (email, password) in [
        ("test@example.com", "badpass"),
        ("nobody@example.com", TEST_PASSWORD),
        ("test@example.com", ""),
    ] {
        let payload = json!({
        "name": "Updated Name",
        "password": "newpassword123",
    });
    let (status, body) = send(
            ctx.client
                .post(ctx.url(TOKEN_URL))
                .json(&json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(
            body["detail"],
            "Unable to authenticate with provided credentials"
        );
        assert!(body.get("token").is_none());
    }
}

#[tokio::test]
async fn test_retrieve_user_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url(ME_URL)).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_retrieve_profile_success() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let (status, body) = send(ctx.get(ME_URL, &token)).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "email": "test@example.com", "name": "Test Name" }));
}

#[tokio::test]
async fn test_post_me_not_allowed() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let request = ctx.post(ME_URL, &token).json(&json!({}));
    let response = request.send().await.unwrap();
    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn test_update_user_profile() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let payload = json!({
        "name": "Updated Name",
        "password": "newpassword123",
    });
    let (status, body) = send(ctx.patch(ME_URL, &token).json(&payload)).await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Updated Name");

    let payload = json!({
        "email": "test@example.com",
        "password": "newpassword123",
    });
    let (status, _) = send(ctx.client.post(ctx.url(TOKEN_URL)).json(&payload)).await;
    assert_eq!(status, 200);

    let payload = json!({
        "email": "test@example.com",
        "password": TEST_PASSWORD,
    });
    let (status, _) = send(ctx.client.post(ctx.url(TOKEN_URL)).json(&payload)).await;
    assert_eq!(status, 400);
}
