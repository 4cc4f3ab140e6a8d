use std::str::FromStr;

use chrono::Duration;

use crate::error::Error;

pub static DATABASE_URL: &str = "DATABASE_URL";
pub static BIND_ADDRESS: &str = "BIND_ADDRESS";
pub static DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub static UPLOAD_PATH: &str = "UPLOAD_PATH";
pub static JWT_SECRET: &str = "JWT_SECRET";
pub static TOKEN_LIFETIME_DAYS: &str = "TOKEN_LIFETIME_DAYS";
pub static POLL_LIFETIME_HOURS: &str = "POLL_LIFETIME_HOURS";
pub static CHOICE_SLOTS: &str = "CHOICE_SLOTS";
pub static MIN_CHOICES: &str = "MIN_CHOICES";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub max_connections: u32,
    pub upload_path: String,
    pub jwt_secret: String,
    pub token_lifetime: Duration,
    pub poll_lifetime: Duration,
    pub poll_form: PollFormConfig,
}

/// Shape of the choice sub-form on the poll creation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollFormConfig {
    pub choice_slots: usize,
    pub min_choices: usize,
}

impl Default for PollFormConfig {
    fn default() -> Self {
        Self { choice_slots: 5, min_choices: 1 }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| Error::ConfigError(format!("environment variable {} not been set", key)));
        let token_lifetime_days: i64 = parse_or(&lookup, TOKEN_LIFETIME_DAYS, 30)?;
        let poll_lifetime_hours: i64 = parse_or(&lookup, POLL_LIFETIME_HOURS, 12)?;
        if token_lifetime_days <= 0 || poll_lifetime_hours <= 0 {
            return Err(Error::ConfigError("lifetimes must be positive".into()));
        }
        let defaults = PollFormConfig::default();
        let poll_form = PollFormConfig {
            choice_slots: parse_or(&lookup, CHOICE_SLOTS, defaults.choice_slots)?,
            min_choices: parse_or(&lookup, MIN_CHOICES, defaults.min_choices)?,
        };
        if poll_form.min_choices == 0 || poll_form.min_choices > poll_form.choice_slots {
            return Err(Error::ConfigError(format!(
                "{} must be between 1 and {} ({})",
                MIN_CHOICES, CHOICE_SLOTS, poll_form.choice_slots
            )));
        }
        Ok(Self {
            database_url: required(DATABASE_URL)?,
            bind_address: lookup(BIND_ADDRESS).unwrap_or_else(|| "0.0.0.0:8000".into()),
            max_connections: parse_or(&lookup, DATABASE_MAX_CONNECTIONS, 5)?,
            upload_path: required(UPLOAD_PATH)?,
            jwt_secret: required(JWT_SECRET)?,
            token_lifetime: Duration::days(token_lifetime_days),
            poll_lifetime: Duration::hours(poll_lifetime_hours),
            poll_form,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e| Error::ConfigError(format!("invalid {}: {}", key, e))),
    }
}
