use actix_multipart::Multipart;
use bytes::BytesMut;
use futures_util::TryStreamExt;

use crate::error::Error;
use crate::forms::{FieldErrors, FilePart, FormData};

/// Largest accepted multipart part, file or text.
pub static MAX_PART_BYTES: usize = 5 * 1024 * 1024;

/// Collects a multipart body into text fields and files. A file input left
/// empty by the browser arrives with an empty filename and is skipped.
pub async fn read_form(payload: Multipart) -> Result<FormData, Error> {
    read_form_limited(payload, MAX_PART_BYTES).await
}

async fn read_form_limited(mut payload: Multipart, limit: usize) -> Result<FormData, Error> {
    let mut data = FormData::default();
    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_owned();
        let filename = field.content_disposition().get_filename().map(str::to_owned);
        let mut content = BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            if content.len() + chunk.len() > limit {
                let mut errors = FieldErrors::default();
                errors.add(&name, format!("Ensure this upload is at most {} bytes.", limit));
                return Err(Error::Validation(errors));
            }
            content.extend_from_slice(&chunk);
        }
        match filename {
            Some(filename) if filename.is_empty() => {}
            Some(filename) => {
                data.files.insert(
                    name,
                    FilePart {
                        filename,
                        content: content.to_vec(),
                    },
                );
            }
            None => {
                let value = String::from_utf8(content.to_vec()).map_err(|e| Error::BusinessError(format!("field {} is not valid utf-8: {}", name, e)))?;
                data.fields.insert(name, value);
            }
        }
    }
    Ok(data)
}
