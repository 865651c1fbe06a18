use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    #[error("Failed to generate salt")]
    SaltGeneration,

    #[error("Stored credential is malformed")]
    InvalidFormat,

    #[error("Password must not be empty")]
    EmptyPassword,
}

/// Salt and derived key, both hex encoded for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedSecret {
    pub salt: String,
    pub hash: String,
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(PBKDF2_ITERATIONS).unwrap_or(NonZeroU32::MIN)
}

/// Derives a PBKDF2-HMAC-SHA256 key from the secret with a fresh random salt.
pub fn hash_secret(secret: &str) -> Result<HashedSecret, CredentialError> {
    if secret.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }

    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| CredentialError::SaltGeneration)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(PBKDF2_ALG, iterations(), &salt, secret.as_bytes(), &mut hash);

    Ok(HashedSecret {
        salt: hex::encode(salt),
        hash: hex::encode(hash),
    })
}

/// Constant-time check of a secret against a stored salt and hash.
pub fn verify_secret(secret: &str, stored: &HashedSecret) -> Result<bool, CredentialError> {
    let salt = hex::decode(&stored.salt).map_err(|_| CredentialError::InvalidFormat)?;
    let hash = hex::decode(&stored.hash).map_err(|_| CredentialError::InvalidFormat)?;

    Ok(pbkdf2::verify(PBKDF2_ALG, iterations(), &salt, secret.as_bytes(), &hash).is_ok())
}
