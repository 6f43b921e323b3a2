use sha2::{Digest, Sha256};

/// Decides whether a caller's credential grants access to backup operations.
pub trait Authenticator {
    fn verify(&self, credential: Option<&str>) -> bool;
}

/// Accepts exactly one admin token. Only its SHA-256 digest is kept in memory.
pub struct TokenAuthenticator {
    digest: Option<[u8; 32]>,
}

impl TokenAuthenticator {
    pub fn new(admin_token: Option<&str>) -> Self {
        Self {
            digest: admin_token.filter(|t| !t.is_empty()).map(token_digest),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }
}

fn token_digest(token: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(token.as_bytes()));
    out
}

impl Authenticator for TokenAuthenticator {
    fn verify(&self, credential: Option<&str>) -> bool {
        let (Some(expected), Some(given)) = (self.digest.as_ref(), credential) else {
            return false;
        };
        let given = token_digest(given);
        // Fold over every byte rather than short-circuiting.
        expected
            .iter()
            .zip(given.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
