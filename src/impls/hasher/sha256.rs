use hex::ToHex;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

use crate::core::ports::hasher::Hasher;

/// Salted SHA-256, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn gen_salt(&self) -> String {
        thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect()
    }

    fn hash_password(&self, password: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password);
        hasher.update(salt);
        hasher.finalize().encode_hex()
    }
}
