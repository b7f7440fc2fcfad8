//! Integration tests for the recipe API.
//!
//! Each test starts its own server on an ephemeral port, backed by the
//! in-memory store and a fresh media directory, and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p recipe-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `user_api` - Registration, tokens, profile
//! - `tags_api`, `ingredients_api` - Owned labels
//! - `recipes_api` - Recipes, filtering, image upload
//! - `postgres_store` - `PgStore` against a live database (ignored unless
//!   run with `--ignored` and `RECIPE_DATABASE_URL` set)

use std::path::PathBuf;

use recipe_api::config::ApiConfig;
use recipe_api::db::MemoryStore;
use recipe_api::services::AuthService;
use recipe_api::state::AppState;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

/// Password used for every account created through [`TestContext`].
pub const TEST_PASSWORD: &str = "testpass123";

/// A running server plus an HTTP client.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: MemoryStore,
    pub media_root: PathBuf,
    server: tokio::task::JoinHandle<()>,
}

impl TestContext {
    /// Start a server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn new() -> Self {
        let dir_name = format!("recipe-it-media-{}", uuid::Uuid::new_v4());
        let media_root = std::env::temp_dir().join(dir_name);
        let store = MemoryStore::new();
        let state = AppState::new(ApiConfig::local(&media_root), store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = recipe_api::app(state);
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            store,
            media_root,
            server,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create a user directly in the store, bypassing the API.
    ///
    /// # Panics
    ///
    /// Panics if the user cannot be created.
    #[allow(clippy::expect_used)]
    pub async fn create_user(&self, email: &str) -> recipe_api::models::User {
        AuthService::new(&self.store)
            .create_user(email, TEST_PASSWORD, "Test Name")
            .await
            .expect("Failed to create test user")
    }

    /// Create a user and return an API token for them.
    ///
    /// # Panics
    ///
    /// Panics if the user or token cannot be created.
    #[allow(clippy::expect_used)]
    pub async fn authenticated_user(&self, email: &str) -> (recipe_api::models::User, String) {
        let user = self.create_user(email).await;
        let token = AuthService::new(&self.store)
            .issue_token(email, TEST_PASSWORD)
            .await
            .expect("Failed to issue test token");
        (user, token)
    }

    /// GET with token authentication.
    #[must_use]
    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        with_token(self.client.get(self.url(path)), token)
    }

    /// POST with token authentication.
    #[must_use]
    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        with_token(self.client.post(self.url(path)), token)
    }

    /// PUT with token authentication.
    #[must_use]
    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        with_token(self.client.put(self.url(path)), token)
    }

    /// PATCH with token authentication.
    #[must_use]
    pub fn patch(&self, path: &str, token: &str) -> RequestBuilder {
        with_token(self.client.patch(self.url(path)), token)
    }

    /// POST `{"name": name}` to `path`, as when creating a tag or ingredient.
    pub async fn post_name(&self, path: &str, token: &str, name: &str) -> (u16, Value) {
        let body = serde_json::json!({ "name": name });
        send(self.post(path, token).json(&body)).await
    }

    /// DELETE with token authentication.
    #[must_use]
    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        with_token(self.client.delete(self.url(path)), token)
    }
}

fn with_token(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header("Authorization", format!("Token {token}"))
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

/// Send a request and decode the JSON body (`Null` when empty).
///
/// # Panics
///
/// Panics if the request fails or the body is not JSON.
#[allow(clippy::expect_used)]
pub async fn send(request: RequestBuilder) -> (u16, Value) {
    let response = request.send().await.expect("Request failed");
    let status = response.status().as_u16();
    let bytes = response.bytes().await.expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, body)
}

/// Names from a JSON array of `{id, name}` objects, in order.
#[must_use]
pub fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
