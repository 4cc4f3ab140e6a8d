use serde::Serialize;

use super::{is_valid_email, optional_image, required_text, validate_username, FieldErrors, FormData};
use crate::core::models::upload_file::Category;
use crate::core::models::user::{Profile, ProfileUpdate};

/// Field whose presence turns a profile submission into an account deletion.
pub static DELETE_ACCOUNT: &str = "delete_account";

#[derive(Debug, Default, Clone, Serialize)]
pub struct Values {
    pub username: String,
    pub email: String,
    pub avatar: String,
}

impl Values {
    pub fn from_form(data: &FormData, current: &Profile) -> Self {
        Self {
            username: data.text("username").unwrap_or_default().to_owned(),
            email: data.text("email").unwrap_or_default().to_owned(),
            avatar: current.avatar.clone(),
        }
    }
}

impl From<Profile> for Values {
    fn from(profile: Profile) -> Self {
        Self {
            username: profile.username,
            email: profile.email,
            avatar: profile.avatar,
        }
    }
}

pub enum Submission {
    Update(ProfileUpdate),
    DeleteAccount,
}

pub fn validate(data: &FormData) -> Result<Submission, FieldErrors> {
    if data.has(DELETE_ACCOUNT) {
        return Ok(Submission::DeleteAccount);
    }
    let mut errors = FieldErrors::default();
    let username = required_text(data, &mut errors, "username", 150);
    validate_username(&mut errors, &username);
    let email = super::optional_text(data, &mut errors, "email", 254);
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    let avatar = optional_image(data, &mut errors, "avatar", Category::Avatar);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Submission::Update(ProfileUpdate { username, email, avatar }))
}
