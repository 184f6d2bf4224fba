//! Salted SHA-256 password digests, stored as `salt$hex`.

use sha2::{Digest, Sha256};
use uuid::Uuid;

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash(password: &str) -> String {
    let salt = Uuid::now_v7().simple().to_string();
    format!("{salt}${}", digest(password, &salt))
}

pub fn verify(candidate: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => {
            let actual = digest(candidate, salt);
            // Comparison must not short-circuit.
            actual.len() == expected.len()
                && actual
                    .bytes()
                    .zip(expected.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let stored = hash("correct horse");
        assert!(verify("correct horse", &stored));
        assert!(!verify("wrong horse", &stored));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash("secret1"), hash("secret1"));
    }

    #[test]
    fn malformed_stored_value_never_verifies() {
        assert!(!verify("anything", "no-separator"));
        assert!(!verify("anything", ""));
    }
}
