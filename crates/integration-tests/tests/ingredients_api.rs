//! Integration tests for the ingredients API.

use recipe_integration_tests::{TestContext, names, send};
use serde_json::json;

const INGREDIENTS_URL: &str = "/recipe/ingredients/";

#[tokio::test]
async fn test_login_required() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url(INGREDIENTS_URL)).send().await;
    assert_eq!(response.unwrap().status().as_u16(), 401);
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let ctx = TestContext::new().await;

    let (status, body) = send(ctx.get(INGREDIENTS_URL, "0123456789abcdef")).await;
    assert_eq!(status, 401);
    assert_eq!(body["detail"], "Invalid token.");
}

#[tokio::test]
async fn test_retrieve_ingredient_list() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    ctx.post_name(INGREDIENTS_URL, &token, "Kale").await;
    ctx.post_name(INGREDIENTS_URL, &token, "Salt").await;

    let (status, body) = send(ctx.get(INGREDIENTS_URL, &token)).await;
    assert_eq!(status, 200);
    assert_eq!(names(&body), vec!["Salt", "Kale"]);
}

#[tokio::test]
async fn test_ingredients_limited_to_user() {
    let ctx = TestContext::new().await;
    let (_, other_token) = ctx.authenticated_user("other@example.com").await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    ctx.post_name(INGREDIENTS_URL, &other_token, "Garlic").await;
    let (_, created) = ctx.post_name(INGREDIENTS_URL, &token, "Tumeric").await;

    let (status, body) = send(ctx.get(INGREDIENTS_URL, &token)).await;
    assert_eq!(status, 200);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Tumeric");
    assert_eq!(items[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_ingredient_invalid() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let (status, body) = ctx.post_name(INGREDIENTS_URL, &token, "").await;
    assert_eq!(status, 400);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_update_and_delete_ingredient() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let (_, created) = ctx.post_name(INGREDIENTS_URL, &token, "Cabbage").await;
    let url = format!("{INGREDIENTS_URL}{}/", created["id"]);

    let rename = json!({ "name": "Lettuce" });
    let (status, body) = send(ctx.patch(&url, &token).json(&rename)).await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Lettuce");

    let (status, _) = send(ctx.delete(&url, &token)).await;
    assert_eq!(status, 204);

    let (_, body) = send(ctx.get(INGREDIENTS_URL, &token)).await;
    assert!(names(&body).is_empty());
}

#[tokio::test]
async fn test_other_users_ingredient_is_not_found() {
    let ctx = TestContext::new().await;
    let (_, owner_token) = ctx.authenticated_user("owner@example.com").await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let (_, created) = ctx.post_name(INGREDIENTS_URL, &owner_token, "Fennel").await;
    let url = format!("{INGREDIENTS_URL}{}/", created["id"]);

    let rename = json!({ "name": "Stolen" });
    let (status, _) = send(ctx.patch(&url, &token).json(&rename)).await;
    assert_eq!(status, 404);
    let (status, _) = send(ctx.delete(&url, &token)).await;
    assert_eq!(status, 404);

    let (_, body) = send(ctx.get(INGREDIENTS_URL, &owner_token)).await;
    assert_eq!(names(&body), vec!["Fennel"]);
}

#[tokio::test]
async fn test_filter_ingredients_assigned_to_recipes() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let (_, apples) = ctx.post_name(INGREDIENTS_URL, &token, "Apples").await;
    ctx.post_name(INGREDIENTS_URL, &token, "Turkey").await;

    for title in ["Apple crumble", "Apple pie"] {
        let recipe = json!({
            "title": title,
            "time_minutes": 5,
            "price": "10.00",
            "ingredients": [apples["id"]],
        });
        let (status, _) = send(ctx.post("/recipe/recipes/", &token).json(&recipe)).await;
        assert_eq!(status, 201);
    }

    let url = format!("{INGREDIENTS_URL}?assigned_only=1");
    let (status, body) = send(ctx.get(&url, &token)).await;
    assert_eq!(status, 200);
    // Assigned to two recipes, listed once.
    assert_eq!(names(&body), vec!["Apples"]);
}
