use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::upload_file::UploadedFileCreate;

pub static DEFAULT_AVATAR: &str = "avatar/default.jpg";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub salt: String,
    pub avatar: String,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub username: String,
    pub email: String,
    pub password: String,
    pub salt: String,
    pub avatar: String,
}

#[derive(Debug, Default)]
pub struct Patch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Validated registration form.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<UploadedFileCreate>,
}

/// Validated profile form.
#[derive(Debug)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub avatar: Option<UploadedFileCreate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            is_superuser: user.is_superuser,
            date_joined: user.date_joined,
        }
    }
}
