//! Integration tests for the recipes API.

use recipe_integration_tests::{TestContext, send};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

const RECIPES_URL: &str = "/recipe/recipes/";

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn detail_url(id: &Value) -> String {
    format!("{RECIPES_URL}{id}/")
}

fn image_upload_url(id: &Value) -> String {
    format!("{RECIPES_URL}{id}/upload-image/")
}

async fn create_recipe(ctx: &TestContext, token: &str, body: Value) -> Value {
    let mut payload = json!({
        "title": "Sample recipe",
        "time_minutes": 10,
        "price": "5.00",
    });
    if let (Some(payload), Some(extra)) = (payload.as_object_mut(), body.as_object()) {
        payload.extend(extra.clone());
    }
    let (status, created) = send(ctx.post(RECIPES_URL, token).json(&payload)).await;
    assert_eq!(status, 201, "create failed: {created}");
    created
}

async fn create_named(ctx: &TestContext, token: &str, kind: &str, name: &str) -> Value {
    let url = format!("/recipe/{kind}/");
    let (status, body) = send(ctx.post(&url, token).json(&json!({ "name": name }))).await;
    assert_eq!(status, 201);
    body
}

fn ids(body: &Value) -> Vec<Value> {
    body.as_array()
        .map(|items| items.iter().map(|r| r["id"].clone()).collect())
        .unwrap_or_default()
}

fn image_form(file_name: &str, bytes: &[u8]) -> Form {
    let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_owned());
    Form::new().part("image", part)
}

#[tokio::test]
async fn test_login_required() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url(RECIPES_URL)).send().await;
    assert_eq!(response.unwrap().status().as_u16(), 401);
}

#[tokio::test]
async fn test_create_basic_recipe() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let recipe = create_recipe(
        &ctx,
        &token,
        json!({
            "title": "Chocolate cheesecake",
            "time_minutes": 30,
            "price": 5,
            "link": "https://example.com/cheesecake",
        }),
    )
    .await;

    assert_eq!(recipe["title"], "Chocolate cheesecake");
    assert_eq!(recipe["time_minutes"], 30);
    assert_eq!(recipe["price"], "5.00");
    assert_eq!(recipe["link"], "https://example.com/cheesecake");
    assert_eq!(recipe["tags"], json!([]));
    assert_eq!(recipe["ingredients"], json!([]));
    assert!(recipe["image"].is_null());
}

#[tokio::test]
async fn test_price_accepts_fractional_number() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let recipe = create_recipe(&ctx, &token, json!({ "price": 5.5 })).await;
    assert_eq!(recipe["price"], "5.50");

    let patch = json!({ "price": 12.25 });
    let request = ctx.patch(&detail_url(&recipe["id"]), &token).json(&patch);
    let (status, body) = send(request).await;
    assert_eq!(status, 200);
    assert_eq!(body["price"], "12.25");
}

#[tokio::test]
async fn test_invalid_price_rejected() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    for price in [json!("-1.00"), json!(1000), json!("1.234"), json!(-2.5)] {
        let payload = json!({ "title": "Bad", "time_minutes": 5, "price": price });
        let (status, body) = send(ctx.post(RECIPES_URL, &token).json(&payload)).await;
        assert_eq!(status, 400, "price {price} accepted");
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn test_list_recipes_newest_first_and_scoped() {
    let ctx = TestContext::new().await;
    let (_, other_token) = ctx.authenticated_user("other@example.com").await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    create_recipe(&ctx, &other_token, json!({ "title": "Not mine" })).await;
    let first = create_recipe(&ctx, &token, json!({ "title": "First" })).await;
    let second = create_recipe(&ctx, &token, json!({ "title": "Second" })).await;

    let (status, body) = send(ctx.get(RECIPES_URL, &token)).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![second["id"].clone(), first["id"].clone()]);
}

#[tokio::test]
async fn test_view_recipe_detail() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let tag = create_named(&ctx, &token, "tags", "Vegan").await;
    let ingredient = create_named(&ctx, &token, "ingredients", "Cabbage").await;
    let relations = json!({ "tags": [tag["id"]], "ingredients": [ingredient["id"]] });
    let recipe = create_recipe(&ctx, &token, relations).await;

    let (status, body) = send(ctx.get(&detail_url(&recipe["id"]), &token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["tags"], json!([{ "id": tag["id"], "name": "Vegan" }]));
    assert_eq!(
        body["ingredients"],
        json!([{ "id": ingredient["id"], "name": "Cabbage" }])
    );
}

#[tokio::test]
async fn test_other_users_recipe_is_not_found() {
    let ctx = TestContext::new().await;
    let (_, owner_token) = ctx.authenticated_user("owner@example.com").await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let recipe = create_recipe(&ctx, &owner_token, json!({})).await;
    let url = detail_url(&recipe["id"]);

    let (status, _) = send(ctx.get(&url, &token)).await;
    assert_eq!(status, 404);
    let rename = json!({ "title": "Mine now" });
    let (status, _) = send(ctx.patch(&url, &token).json(&rename)).await;
    assert_eq!(status, 404);
    let (status, _) = send(ctx.delete(&url, &token)).await;
    assert_eq!(status, 404);

    let (status, body) = send(ctx.get(&url, &owner_token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Sample recipe");
}

#[tokio::test]
async fn test_cannot_attach_other_users_tag() {
    let ctx = TestContext::new().await;
    let (_, other_token) = ctx.authenticated_user("other@example.com").await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let foreign_tag = create_named(&ctx, &other_token, "tags", "Secret").await;

    let payload = json!({
        "title": "Sneaky",
        "time_minutes": 5,
        "price": "1.00",
        "tags": [foreign_tag["id"]],
    });
    let (status, body) = send(ctx.post(RECIPES_URL, &token).json(&payload)).await;
    assert_eq!(status, 400);
    assert!(body["detail"].as_str().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_partial_update_recipe() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let tag = create_named(&ctx, &token, "tags", "Spicy").await;
    let recipe = create_recipe(&ctx, &token, json!({ "tags": [tag["id"]] })).await;
    let new_tag = create_named(&ctx, &token, "tags", "Curry").await;

    let patch = json!({ "title": "Chicken tikka", "tags": [new_tag["id"]] });
    let url = detail_url(&recipe["id"]);
    let (status, body) = send(ctx.patch(&url, &token).json(&patch)).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Chicken tikka");
    assert_eq!(body["tags"], json!([new_tag["id"]]));
    assert_eq!(body["price"], "5.00");
}

#[tokio::test]
async fn test_full_update_recipe() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let tag = create_named(&ctx, &token, "tags", "Spicy").await;
    let recipe = create_recipe(&ctx, &token, json!({ "tags": [tag["id"]] })).await;
    let url = detail_url(&recipe["id"]);

    let replacement = json!({
        "title": "Spaghetti carbonara",
        "time_minutes": 25,
        "price": "5.00",
    });
    let (status, body) = send(ctx.put(&url, &token).json(&replacement)).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Spaghetti carbonara");
    assert_eq!(body["time_minutes"], 25);
    assert_eq!(body["tags"], json!([]));

    let incomplete = json!({ "title": "Missing fields" });
    let (status, _) = send(ctx.put(&url, &token).json(&incomplete)).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_delete_recipe() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let recipe = create_recipe(&ctx, &token, json!({})).await;

    let (status, _) = send(ctx.delete(&detail_url(&recipe["id"]), &token)).await;
    assert_eq!(status, 204);
    let (status, _) = send(ctx.get(&detail_url(&recipe["id"]), &token)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_filter_recipes_by_tags_and_ingredients() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;

    let vegan = create_named(&ctx, &token, "tags", "Vegan").await;
    let vegetarian = create_named(&ctx, &token, "tags", "Vegetarian").await;
    let feta = create_named(&ctx, &token, "ingredients", "Feta cheese").await;

    let curry_body = json!({ "title": "Thai curry", "tags": [vegan["id"]] });
    let curry = create_recipe(&ctx, &token, curry_body).await;
    let tahini_body = json!({
        "title": "Aubergine with tahini",
        "tags": [vegetarian["id"]],
        "ingredients": [feta["id"]],
    });
    let tahini = create_recipe(&ctx, &token, tahini_body).await;
    let plain = create_recipe(&ctx, &token, json!({ "title": "Fish and chips" })).await;

    let url = format!("{RECIPES_URL}?tags={},{}", vegan["id"], vegetarian["id"]);
    let (status, body) = send(ctx.get(&url, &token)).await;
    assert_eq!(status, 200);
    let found = ids(&body);
    assert!(found.contains(&curry["id"]));
    assert!(found.contains(&tahini["id"]));
    assert!(!found.contains(&plain["id"]));

    let (tag, ingredient) = (&vegan["id"], &feta["id"]);
    let url = format!("{RECIPES_URL}?tags={tag}&ingredients={ingredient}");
    let (_, body) = send(ctx.get(&url, &token)).await;
    assert!(ids(&body).is_empty());

    let (status, _) = send(ctx.get(&format!("{RECIPES_URL}?tags=abc"), &token)).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_upload_image_to_recipe() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let recipe = create_recipe(&ctx, &token, json!({})).await;

    let form = image_form("photo.png", PNG_BYTES);
    let url = image_upload_url(&recipe["id"]);
    let (status, body) = send(ctx.post(&url, &token).multipart(form)).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], recipe["id"]);

    let image_url = body["image"].as_str().unwrap().to_owned();
    assert!(image_url.starts_with("/media/uploads/recipe/"));
    assert!(image_url.ends_with(".png"));

    let relative = image_url.trim_start_matches("/media/");
    assert!(ctx.media_root.join(relative).exists());

    let response = ctx.client.get(ctx.url(&image_url)).send().await;
    let response = response.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), PNG_BYTES);

    let (_, detail) = send(ctx.get(&detail_url(&recipe["id"]), &token)).await;
    assert_eq!(detail["image"], image_url.as_str());
}

#[tokio::test]
async fn test_upload_image_bad_request() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.authenticated_user("test@example.com").await;
    let recipe = create_recipe(&ctx, &token, json!({})).await;
    let url = image_upload_url(&recipe["id"]);

    let form = Form::new().text("image", "notimage");
    let (status, _) = send(ctx.post(&url, &token).multipart(form)).await;
    assert_eq!(status, 400);

    let form = image_form("evil.p/ng", b"data");
    let (status, _) = send(ctx.post(&url, &token).multipart(form)).await;
    assert_eq!(status, 400);

    let (_, detail) = send(ctx.get(&detail_url(&recipe["id"]), &token)).await;
    assert!(detail["image"].is_null());
}
