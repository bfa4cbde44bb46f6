use anyhow::Context;
use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};
use tracing::error;

const SALT_BYTES: usize = 16;
const HASH_BYTES: usize = 64;

/// Fresh 128-bit salt, hex-encoded.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    hex::encode(salt)
}

fn hasher() -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        Params::DEFAULT_T_COST,
        Params::DEFAULT_P_COST,
        Some(HASH_BYTES),
    )
    .map_err(|e| anyhow::anyhow!("argon2 params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Derives the 64-byte hash of `plain` under `salt` and hex-encodes it.
///
/// Deterministic for a given `(plain, salt)` pair.
pub fn hash_password(plain: &str, salt: &str) -> anyhow::Result<String> {
    let mut out = [0u8; HASH_BYTES];
    hasher()?
        .hash_password_into(plain.as_bytes(), salt.as_bytes(), &mut out)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(hex::encode(out))
}

pub fn verify_password(plain: &str, salt: &str, expected_hash: &str) -> anyhow::Result<bool> {
    let candidate = hash_password(plain, salt)?;
    Ok(constant_time_eq(candidate.as_bytes(), expected_hash.as_bytes()))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(plain: String, salt: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain, &salt))
        .await
        .context("password hashing task failed")?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(plain: String, salt: String, expected_hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &salt, &expected_hash))
        .await
        .context("password verification task failed")?
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_is_32_hex_chars_and_fresh() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_deterministic_and_64_bytes() {
        let salt = generate_salt();
        let first = hash_password("Secur3P@ssw0rd!", &salt).expect("hashing should succeed");
        let second = hash_password("Secur3P@ssw0rd!", &salt).expect("hashing should succeed");
        assert_eq!(first, second);
        assert_eq!(first.len(), HASH_BYTES * 2);
    }

    #[test]
    fn different_salts_give_different_hashes() {
        let password = "correct-horse-battery-staple";
        let a = hash_password(password, &generate_salt()).unwrap();
        let b = hash_password(password, &generate_salt()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let salt = generate_salt();
        let hash = hash_password("correct-horse-battery-staple", &salt).unwrap();
        assert!(verify_password("correct-horse-battery-staple", &salt, &hash).unwrap());
        assert!(!verify_password("wrong-password", &salt, &hash).unwrap());
    }

    #[test]
    fn short_salt_is_an_error() {
        let err = hash_password("anything", "abc").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn blocking_variants_match_direct_calls() {
        let salt = generate_salt();
        let direct = hash_password("pan-seared-tofu", &salt).unwrap();
        let pooled = hash_password_blocking("pan-seared-tofu".into(), salt.clone()).await.unwrap();
        assert_eq!(direct, pooled);
        assert!(verify_password_blocking("pan-seared-tofu".into(), salt.clone(), direct.clone()).await.unwrap());
        assert!(!verify_password_blocking("pan-fried-tofu".into(), salt, direct).await.unwrap());
    }
}
