use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// One-way password transform. Verification must agree with whatever scheme
/// produced the stored value, so the scheme is fixed per deployment and
/// swapped here, never inside the identity manager.
pub trait PasswordScheme: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    fn verify(&self, plain: &str, stored: &str) -> anyhow::Result<bool>;
}

/// Picks the scheme named in the configuration; anything unrecognized falls
/// back to the default fold scheme.
pub fn scheme(name: &str) -> Arc<dyn PasswordScheme> {
    match name {
        "argon2" => Arc::new(Argon2Scheme),
        "fold" => Arc::new(FoldScheme),
        other => {
            warn!(scheme = other, "unknown password scheme, using fold");
            Arc::new(FoldScheme)
        }
    }
}

/// Deterministic placeholder: a 31-multiplier polynomial fold of the
/// password bytes, hex-encoded. Verification is string equality of the
/// transform. NOT cryptographically secure; see [`Argon2Scheme`] for the
/// real substitute.
pub struct FoldScheme;

fn fold(plain: &str) -> String {
    let mut acc: u32 = 0;
    for b in plain.bytes() {
        acc = acc.wrapping_mul(31).wrapping_add(u32::from(b));
    }
    format!("{acc:08x}")
}

impl PasswordScheme for FoldScheme {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        Ok(fold(plain))
    }

    fn verify(&self, plain: &str, stored: &str) -> anyhow::Result<bool> {
        Ok(fold(plain) == stored)
    }
}

/// Salted argon2, the scheme to run with outside of prototyping
/// (`PASSWORD_SCHEME=argon2`).
pub struct Argon2Scheme;

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, stored: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
