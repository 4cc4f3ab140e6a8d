use crate::core::models::upload_file::UploadedFileCreate;
use crate::error::Error;

pub trait Uploader {
    /// Stores the file and returns its path relative to the media root.
    async fn put(&self, file: UploadedFileCreate) -> Result<String, Error>;
    async fn delete(&self, path: &str) -> Result<(), Error>;
}
