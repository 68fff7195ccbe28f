use std::path::{Path, PathBuf};

use kinotek_core::models::{AssetKind, MediaAsset};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot store empty file")]
    EmptyFile,

    #[error("Filename contains invalid path sequence: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Local filesystem store for uploaded media.
///
/// Each [`AssetKind`] has its own base directory. Files are stored under a
/// fresh UUID plus the original extension, so concurrent uploads never
/// collide on a name.
pub struct MediaStore {
    video_dir: PathBuf,
    thumbnail_dir: PathBuf,
}

impl MediaStore {
    /// Create the store, creating both base directories if needed.
    pub async fn new(
        video_dir: impl Into<PathBuf>,
        thumbnail_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let video_dir = video_dir.into();
        let thumbnail_dir = thumbnail_dir.into();

        fs::create_dir_all(&video_dir).await?;
        fs::create_dir_all(&thumbnail_dir).await?;

        Ok(Self {
            video_dir,
            thumbnail_dir,
        })
    }

    fn base_dir(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Video => &self.video_dir,
            AssetKind::Thumbnail => &self.thumbnail_dir,
        }
    }

    /// Filesystem path of a stored asset, for read-back by the file-serving
    /// layer.
    pub fn path_for(&self, kind: AssetKind, generated_name: &str) -> PathBuf {
        self.base_dir(kind).join(generated_name)
    }

    /// Store `data` under a freshly generated name and return its descriptor.
    ///
    /// The write goes to a temporary sibling first and is renamed into place,
    /// so a repeated name is an atomic replace and an aborted write never
    /// leaves a partial file under the final name.
    pub async fn store(
        &self,
        data: &[u8],
        original_name: &str,
        content_type: &str,
        kind: AssetKind,
    ) -> StorageResult<MediaAsset> {
        if data.is_empty() {
            return Err(StorageError::EmptyFile);
        }
        if original_name.contains("..") {
            return Err(StorageError::InvalidFilename(original_name.to_string()));
        }

        let generated_name = format!("{}{}", Uuid::new_v4(), extension_of(original_name));
        let target = self.base_dir(kind).join(&generated_name);
        let tmp = self.base_dir(kind).join(format!("{generated_name}.part"));

        if let Err(e) = write_then_rename(&tmp, &target, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StorageError::Io(e));
        }

        tracing::info!(
            path = %target.display(),
            kind = %kind,
            size_bytes = data.len(),
            "Stored uploaded file"
        );

        Ok(MediaAsset {
            generated_name,
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            byte_size: data.len() as u64,
            storage_path: target,
            kind,
        })
    }

    /// Remove a stored asset. A missing file is not an error; deletion is
    /// best-effort by contract.
    pub async fn remove(&self, kind: AssetKind, generated_name: &str) -> StorageResult<()> {
        let path = self.path_for(kind, generated_name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed stored file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_then_rename(tmp: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, target).await
}

/// Extension of `filename` including the dot, or empty when there is none.
fn extension_of(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[idx..],
        None => "",
    }
}
