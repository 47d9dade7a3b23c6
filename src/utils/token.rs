//! `Auth-Token` header values.
//!
//! A token is the lowercase hex HMAC-SHA256 of the username keyed with the
//! server secret, so it can be checked without a session table.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

fn digest(secret: &str, username: &str) -> Vec<u8> {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(username.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

pub fn issue_auth_token(secret: &str, username: &str) -> String {
    hex::encode(digest(secret, username))
}

pub fn verify_auth_token(secret: &str, username: &str, token: &str) -> bool {
    let Ok(provided) = hex::decode(token.trim()) else {
        return false;
    };
    let expected = digest(secret, username);
    provided.len() == expected.len() && bool::from(provided.ct_eq(&expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_for_same_user_only() {
        let token = issue_auth_token("s3cret", "alice");
        assert_eq!(token.len(), 64);
        assert!(verify_auth_token("s3cret", "alice", &token));
        assert!(!verify_auth_token("s3cret", "bob", &token));
        assert!(!verify_auth_token("other", "alice", &token));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(!verify_auth_token("s3cret", "alice", ""));
        assert!(!verify_auth_token("s3cret", "alice", "zzzz"));
        assert!(!verify_auth_token("s3cret", "alice", "abcd"));
    }
}
