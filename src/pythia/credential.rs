//! Password hashing.
//!
//! The store never sees a plaintext password on disk: the facade hands every
//! new password to a [`CredentialHasher`] and keeps only the resulting
//! [`Credential`]. Any one-way scheme can be plugged in; [`Sha3Hasher`] is the
//! default.

use crate::model::Credential;
use rand::RngCore;
use sha3::{Digest, Sha3_256};

const SCHEME: &str = "sha3";
const SALT_LEN: usize = 16;

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Credential;

    fn verify(&self, credential: &Credential, plaintext: &str) -> bool;
}

/// Salted SHA3-256, stored as `sha3$<salt hex>$<digest hex>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha3Hasher;

impl Sha3Hasher {
    fn digest(salt: &[u8], plaintext: &str) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(salt);
        hasher.update(plaintext.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}

impl CredentialHasher for Sha3Hasher {
    fn hash(&self, plaintext: &str) -> Credential {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = Self::digest(&salt, plaintext);
        Credential::from_hash(format!(
            "{SCHEME}${}${}",
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    fn verify(&self, credential: &Credential, plaintext: &str) -> bool {
        let mut parts = credential.as_str().split('$');
        let (Some(SCHEME), Some(salt), Some(expected), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
            return false;
        };

        let actual = Self::digest(&salt, plaintext);
        expected.len() == actual.len()
            && expected
                .iter()
                .zip(actual.iter())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}
