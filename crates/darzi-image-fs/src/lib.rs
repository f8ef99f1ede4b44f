use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use darzi_core::{DarziError, DarziResult, ImageStore};

/// Filesystem-backed image storage. Files land under
/// `{base_path}/{folder}/{name}` and are served back by the `/uploads`
/// static route, so stored paths are returned as `/uploads/{folder}/{name}`.
#[derive(Clone)]
pub struct FsImageStore {
    base_path: PathBuf,
}

impl FsImageStore {
    pub fn new(path: &str) -> DarziResult<Self> {
        let base_path = PathBuf::from(path);
        std::fs::create_dir_all(&base_path)
            .map_err(|e| DarziError::Storage(format!("failed to create uploads directory: {e}")))?;
        Ok(Self { base_path })
    }

    /// Strip path separators so a crafted name cannot escape the base
    /// directory.
    fn safe_component(value: &str) -> String {
        value
            .chars()
            .filter(|c| !matches!(c, '/' | '\\'))
            .collect::<String>()
            .replace("..", "_")
    }

    fn image_path(&self, folder: &str, name: &str) -> PathBuf {
        self.base_path
            .join(Self::safe_component(folder))
            .join(Self::safe_component(name))
    }

    fn public_path(folder: &str, name: &str) -> String {
        format!(
            "/uploads/{}/{}",
            Self::safe_component(folder),
            Self::safe_component(name)
        )
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put_image(&self, folder: &str, name: &str, data: Bytes) -> DarziResult<String> {
        let path = self.image_path(folder, name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DarziError::Storage(format!("failed to create image folder: {e}")))?;
        }

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| DarziError::Storage(format!("failed to write image: {e}")))?;

        Ok(Self::public_path(folder, name))
    }

    async fn get_image(&self, folder: &str, name: &str) -> DarziResult<Option<Bytes>> {
        let path = self.image_path(folder, name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DarziError::Storage(format!("failed to read image: {e}"))),
        }
    }

    async fn delete_image(&self, folder: &str, name: &str) -> DarziResult<()> {
        let path = self.image_path(folder, name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DarziError::Storage(format!("failed to delete image: {e}"))),
        }
    }
}
