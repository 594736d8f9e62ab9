use crate::workflows::auth::{HashError, PasswordHasher};

/// Adaptive bcrypt digests in the `$2b$<cost>$...` modular format.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        bcrypt::hash(password, self.cost).map_err(|err| HashError(err.to_string()))
    }

    /// Unreadable stored hashes never match.
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        bcrypt::verify(password, stored_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(4)
    }

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let hasher = hasher();
        let first = hasher.hash("correct-horse").expect("hash");
        let second = hasher.hash("correct-horse").expect("hash");
        assert_ne!(first, second);
        assert!(first.starts_with("$2b$04$"));
        assert!(hasher.verify("correct-horse", &first));
        assert!(hasher.verify("correct-horse", &second));
        assert!(!hasher.verify("wrong-horse", &first));
    }

    #[test]
    fn plaintext_never_appears_in_digest() {
        let digest = hasher().hash("correct-horse").expect("hash");
        assert!(!digest.contains("correct-horse"));
    }

    #[test]
    fn malformed_stored_hash_does_not_match() {
        let hasher = hasher();
        assert!(!hasher.verify("correct-horse", "not-a-hash"));
        assert!(!hasher.verify("correct-horse", "salt$0123abcd"));
        assert!(!hasher.verify("", ""));
    }

    #[test]
    fn out_of_range_cost_is_an_error() {
        assert!(BcryptPasswordHasher::new(2).hash("correct-horse").is_err());
    }
}
