//! Salted password hashes.
//!
//! New credentials are [PHC strings] produced by Argon2. Existing bcrypt hashes (`$2a$`, `$2b$`,
//! `$2y$`) are still accepted. Either way, verification reads the salt and cost parameters from
//! the stored hash itself.
//!
//! [PHC strings]: https://github.com/P-H-C/phc-string-format/blob/master/phc-sf-spec.md
use crate::error::Error;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use lazy_static::lazy_static;
use rand::rngs::OsRng;

lazy_static! {
    // Checked against when the user is unknown, so that path costs as much as a wrong password.
    static ref DECOY_HASH: String = hash_password("ddnsgate decoy").unwrap_or_default();
}

/// Hash a password with a fresh random salt and the default Argon2id parameters.
///
/// # Errors
///
/// Returns [`Error::Hash`] if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Hash(e.to_string()))
}

const BCRYPT_PREFIX: &str = "$2";

/// Check `password` against a stored bcrypt or PHC hash. A hash that can't be parsed never
/// matches.
#[must_use]
pub fn verify(password: &str, hash: &str) -> bool {
    if hash.starts_with(BCRYPT_PREFIX) {
        return bcrypt::verify(password, hash).unwrap_or(false);
    }
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Spend the same effort as [`verify`] without any stored hash to compare to.
pub fn verify_decoy(password: &str) {
    let _ = verify(password, &DECOY_HASH);
}

#[cfg(test)]
pub(crate) fn cheap_hash(password: &str) -> String {
    use argon2::{Algorithm, Params, Version};
    let params = Params::new(1024, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify("hunter2", &hash));
        assert!(!verify("hunter3", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(cheap_hash("hunter2"), cheap_hash("hunter2"));
    }

    #[test]
    fn parameters_come_from_the_stored_hash() {
        let hash = cheap_hash("secret");
        assert!(hash.contains("m=1024,t=1,p=1"));
        assert!(verify("secret", &hash));
        assert!(!verify("Secret", &hash));
    }

    #[test]
    fn bcrypt_hashes_are_accepted() {
        let hash = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        assert!(verify("U*U", hash));
        assert!(!verify("U*V", hash));

        let fresh = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify("hunter2", &fresh));
        assert!(!verify("hunter3", &fresh));
    }

    #[test]
    fn malformed_bcrypt_hash_never_matches() {
        assert!(!verify("U*U", "$2a$05$short"));
    }

    #[test]
    fn plaintext_is_not_a_hash() {
        assert!(!verify("secret", "secret"));
        assert!(!verify("", ""));
    }
}
