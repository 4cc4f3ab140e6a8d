//! Submitted form data and its validation into core models.

pub mod login;
pub mod poll;
pub mod profile;
pub mod registration;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::core::models::upload_file::{Category, UploadedFileCreate};

pub static REQUIRED: &str = "This field is required.";
pub static NON_FIELD_ERRORS: &str = "__all__";
pub static IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Errors keyed by field name, in a stable order.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Text fields and files of a submitted form.
#[derive(Debug, Default, Clone)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, FilePart>,
}

impl FormData {
    /// Trimmed value, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

pub(crate) fn required_text(data: &FormData, errors: &mut FieldErrors, name: &str, max_len: usize) -> String {
    match data.text(name) {
        None => {
            errors.add(name, REQUIRED);
            String::new()
        }
        Some(v) => {
            check_length(errors, name, v, max_len);
            v.to_owned()
        }
    }
}

pub(crate) fn optional_text(data: &FormData, errors: &mut FieldErrors, name: &str, max_len: usize) -> String {
    let v = data.text(name).unwrap_or_default();
    check_length(errors, name, v, max_len);
    v.to_owned()
}

fn check_length(errors: &mut FieldErrors, name: &str, value: &str, max_len: usize) {
    let len = value.chars().count();
    if len > max_len {
        errors.add(name, format!("Ensure this value has at most {} characters (it has {}).", max_len, len));
    }
}

pub(crate) fn optional_image(data: &FormData, errors: &mut FieldErrors, name: &str, category: Category) -> Option<UploadedFileCreate> {
    let part = data.files.get(name)?;
    let extension = part.filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        errors.add(
            name,
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        );
        return None;
    }
    if part.content.is_empty() {
        errors.add(name, "The submitted file is empty.");
        return None;
    }
    Some(UploadedFileCreate {
        category,
        extension,
        content: part.content.clone(),
    })
}

pub(crate) fn validate_username(errors: &mut FieldErrors, username: &str) {
    if username.is_empty() {
        return;
    }
    if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        errors.add("username", "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.");
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}
