//! Storage path naming for uploaded recipe images.
//!
//! Uploaded files are never stored under their client-supplied name. Each
//! upload gets a fresh random token and keeps only the original extension:
//!
//! ```text
//! uploads/recipe/<token>.<ext>
//! ```

use uuid::Uuid;

/// Directory (relative to the media root) that holds recipe images.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Source of unique tokens for upload file names.
pub trait UploadToken {
    /// Produce a new token. Every call must return a value that has not
    /// been returned before.
    fn next_token(&self) -> String;
}

/// Random UUID v4 tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuid;

impl UploadToken for RandomUuid {
    fn next_token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> UploadToken for F
where
    F: Fn() -> String,
{
    fn next_token(&self) -> String {
        self()
    }
}

/// Extension of a client file name: everything after the final `.`.
///
/// A name with no `.` is returned unchanged.
#[must_use]
pub fn file_extension(original_filename: &str) -> &str {
    original_filename
        .rsplit_once('.')
        .map_or(original_filename, |(_, ext)| ext)
}

/// Derive the storage path for an uploaded recipe image.
///
/// ```
/// use recipe_core::recipe_image_file_path;
///
/// let fixed = || "test-uuid".to_owned();
/// assert_eq!(
///     recipe_image_file_path(&fixed, "myimage.jpg"),
///     "uploads/recipe/test-uuid.jpg"
/// );
/// ```
#[must_use]
pub fn recipe_image_file_path(tokens: &impl UploadToken, original_filename: &str) -> String {
    let ext = file_extension(original_filename);
    format!("{RECIPE_IMAGE_DIR}/{}.{ext}", tokens.next_token())
}
