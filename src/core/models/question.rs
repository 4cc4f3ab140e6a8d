use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::choice::{Choice, ChoiceResult};
use super::upload_file::UploadedFileCreate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub question_text: String,
    pub question_description: String,
    pub picture: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Question {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }

    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        self.pub_date >= now - Duration::days(1)
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub question_text: String,
    pub question_description: String,
    pub picture: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Validated poll form together with its choice sub-form.
#[derive(Debug)]
pub struct Create {
    pub question_text: String,
    pub question_description: String,
    pub picture: Option<UploadedFileCreate>,
    pub choices: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct Query {
    pub id_eq: Option<i32>,
    /// Keep only questions still open at this instant.
    pub open_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    #[serde(flatten)]
    pub question: Question,
    pub is_expired: bool,
    pub was_published_recently: bool,
}

impl Item {
    pub fn new(question: Question, now: DateTime<Utc>) -> Self {
        Self {
            is_expired: question.is_expired(now),
            was_published_recently: question.was_published_recently(now),
            question,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Detail {
    pub question: Question,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Results {
    pub question: Question,
    pub choices_with_percent: Vec<ChoiceResult>,
    pub user_choice_id: Option<i32>,
    pub total_votes: i64,
}
