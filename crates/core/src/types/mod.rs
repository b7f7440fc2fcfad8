//! Core types for the recipe API.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod image;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::{RECIPE_IMAGE_DIR, RandomUuid, UploadToken, file_extension, recipe_image_file_path};
pub use price::{Price, PriceError};
