use std::path::PathBuf;

use tokio::fs::{create_dir_all, remove_file, write};
use uuid::Uuid;

use crate::core::models::upload_file::UploadedFileCreate;
use crate::core::ports::uploader::Uploader;
use crate::error::Error;

/// Files uploads under `<path>/<category>/<uuid>.<ext>`. The returned path is
/// relative to `path`, which is served under `/media`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Uploader for LocalStorage {
    async fn put(&self, file: UploadedFileCreate) -> Result<String, Error> {
        let dir = file.category.dir();
        create_dir_all(self.path.join(dir)).await?;
        let name = format!("{}/{}.{}", dir, Uuid::new_v4(), file.extension);
        write(self.path.join(&name), file.content).await?;
        log::debug!("stored upload {}", name);
        Ok(name)
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        if path.split('/').any(|seg| seg == "..") {
            return Err(Error::BusinessError(format!("invalid upload path: {}", path)));
        }
        remove_file(self.path.join(path)).await?;
        Ok(())
    }
}
