use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::{distr::Alphanumeric, Rng};

const TOKEN_LEN: usize = 48;

fn hasher() -> Argon2<'static> {
    // Test builds use the minimum cost.
    let params = if cfg!(test) {
        Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .unwrap_or_default()
    } else {
        Params::default()
    };
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Argon2id PHC string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow::anyhow!("encoding password salt: {e}"))?;
    let hash = hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?;
    Ok(hash.to_string())
}

/// Cost parameters come from the stored string, so older hashes keep
/// verifying after the defaults change.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => hasher()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Opaque bearer / reset token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("hunter22").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("same-pass").unwrap(),
            hash_password("same-pass").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", "no-separator"));
        assert!(!verify_password("x", "salt$short"));
        assert!(!verify_password("x", ""));
    }

    #[test]
    fn test_hash_from_other_cost_still_verifies() {
        let params = Params::new(16, 2, 1, None).unwrap();
        let salt = SaltString::encode_b64(b"fixed-salt-bytes").unwrap();
        let stored = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(b"hunter22", &salt)
            .unwrap()
            .to_string();
        assert!(verify_password("hunter22", &stored));
    }

    #[test]
    fn test_token_shape() {
        let t = generate_token();
        assert_eq!(t.len(), TOKEN_LEN);
        assert!(t.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
