use serde::Serialize;

use super::{is_valid_email, optional_image, required_text, validate_username, FieldErrors, FormData};
use crate::core::models::upload_file::Category;
use crate::core::models::user::Registration;

pub static PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// What the registration page shows back; passwords are never echoed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Values {
    pub username: String,
    pub email: String,
}

impl Values {
    pub fn from_form(data: &FormData) -> Self {
        Self {
            username: data.text("username").unwrap_or_default().to_owned(),
            email: data.text("email").unwrap_or_default().to_owned(),
        }
    }
}

fn validate_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < 8 {
        errors.add("password1", "This password is too short. It must contain at least 8 characters.");
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password1", "This password is entirely numeric.");
    }
}

pub fn validate(data: &FormData) -> Result<Registration, FieldErrors> {
    let mut errors = FieldErrors::default();
    let username = required_text(data, &mut errors, "username", 150);
    validate_username(&mut errors, &username);
    let email = required_text(data, &mut errors, "email", 50);
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    // Passwords are taken verbatim, surrounding spaces included.
    let password1 = data.fields.get("password1").cloned().unwrap_or_default();
    let password2 = data.fields.get("password2").cloned().unwrap_or_default();
    if password1.is_empty() {
        errors.add("password1", super::REQUIRED);
    } else {
        validate_password(&mut errors, &password1);
    }
    if password2.is_empty() {
        errors.add("password2", super::REQUIRED);
    } else if password1 != password2 {
        errors.add("password2", PASSWORD_MISMATCH);
    }
    let avatar = optional_image(data, &mut errors, "avatar", Category::Avatar);
    if !data.files.contains_key("avatar") {
        errors.add("avatar", super::REQUIRED);
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Registration {
        username,
        email,
        password: password1,
        avatar,
    })
}
