//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Store;
use crate::services::MediaStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// injected store, media storage, and configuration.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S> {
    config: ApiConfig,
    store: S,
    media: MediaStorage,
}

// Manual impl: `S` itself need not be `Clone` for the `Arc` to be.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `store` - Repository implementation
    #[must_use]
    pub fn new(config: ApiConfig, store: S) -> Self {
        let media = MediaStorage::new(config.media_root.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                media,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the repository store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Get a reference to the media storage.
    #[must_use]
    pub fn media(&self) -> &MediaStorage {
        &self.inner.media
    }
}
