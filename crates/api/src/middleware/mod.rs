//! HTTP middleware and extractors.
//!
//! # Layer Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Body limit (uploads)
//!
//! Authentication is an extractor rather than a layer so public routes and
//! protected routes can share one router.

pub mod auth;

pub use auth::RequireAuth;
