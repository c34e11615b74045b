use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::domain::post::POST_IMAGES_DIR;

#[derive(Debug, Error)]
pub(crate) enum MediaError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("image must not exceed {limit} bytes")]
    TooLarge { limit: usize },

    #[error("image is empty")]
    Empty,

    #[error("failed to store image")]
    Io(#[from] std::io::Error),
}

/// Uploaded files on local disk, addressed by paths relative to `root`.
#[derive(Debug, Clone)]
pub(crate) struct MediaStorage {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl MediaStorage {
    pub(crate) fn new(root: impl Into<PathBuf>, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Stores a post image and returns its path relative to the media root,
    /// e.g. `post_images/<uuid>.png`.
    pub(crate) async fn save_post_image(
        &self,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, MediaError> {
        let extension = image_extension(content_type)
            .ok_or_else(|| MediaError::UnsupportedType(content_type.to_string()))?;
        if data.is_empty() {
            return Err(MediaError::Empty);
        }
        if data.len() > self.max_upload_bytes {
            return Err(MediaError::TooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let dir = self.root.join(POST_IMAGES_DIR);
        fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        fs::write(dir.join(&file_name), data).await?;

        Ok(format!("{POST_IMAGES_DIR}/{file_name}"))
    }

    /// Deletes a previously stored post image. Missing files and paths
    /// outside the post image namespace are ignored.
    pub(crate) async fn remove_post_image(&self, relative_path: &str) -> Result<(), MediaError> {
        let Some(file_name) = relative_path
            .strip_prefix(POST_IMAGES_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(());
        };
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Ok(());
        }

        match fs::remove_file(self.root.join(POST_IMAGES_DIR).join(file_name)).await {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
