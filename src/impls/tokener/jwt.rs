use crate::core::ports::tokener::{Payload, Tokener};
use crate::error::Error;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct JWT {
    secret: Vec<u8>,
}

impl JWT {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<P> Tokener<P> for JWT
where
    P: Payload,
{
    fn gen_token(&self, payload: &P) -> Result<String, Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(&self.secret);
        let token = encode(&header, payload, &key)?;
        Ok(token)
    }
    fn verify_token(&self, token: &str) -> Result<P, Error> {
        let key = DecodingKey::from_secret(&self.secret);
        let validation = Validation::new(Algorithm::HS256);
        let payload = decode(token, &key, &validation)?;
        Ok(payload.claims)
    }
}

/// Session claim: `user` holds the user id.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claim {
    pub user: String,
    pub exp: i64,
}

impl Claim {
    pub fn new(uid: i32, lifetime: Duration) -> Self {
        Self {
            user: uid.to_string(),
            exp: (Utc::now() + lifetime).timestamp(),
        }
    }

    pub fn uid(&self) -> Option<i32> {
        self.user().parse().ok()
    }
}

impl Payload for Claim {
    fn user(&self) -> &str {
        &self.user
    }
}
