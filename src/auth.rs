//! Accounts and bearer sessions.
//!
//! Passwords are stored as PBKDF2 PHC strings. Session tokens are random
//! 32-byte values handed to the client once; only their SHA-256 hash is
//! persisted, alongside the role and profile id the token speaks for.

use chrono::{Duration, Utc};
use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::session::{self, SessionRecord};
use crate::db::DatabaseError;
use crate::models::enums::Role;

/// Sessions expire a day after issue, matching field usage patterns
/// (health workers log in each morning).
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Pbkdf2
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    use base64::Engine;
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    base64::engine::general_purpose::STANDARD_NO_PAD.encode(hasher.finalize())
}

/// Issue a fresh session for a user and return the bearer token.
pub fn issue_session(
    conn: &Connection,
    user_id: &Uuid,
    role: Role,
    profile_id: Option<Uuid>,
) -> Result<String, AuthError> {
    session::prune_expired(conn)?;

    let token = generate_token();
    session::insert_session(
        conn,
        &hash_token(&token),
        &SessionRecord {
            user_id: *user_id,
            role,
            profile_id,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
        },
    )?;
    Ok(token)
}

/// Resolve a bearer token to its session, if valid and unexpired.
pub fn authenticate(
    conn: &Connection,
    token: &str,
) -> Result<Option<SessionRecord>, AuthError> {
    let Some(record) = session::get_session(conn, &hash_token(token))? else {
        return Ok(None);
    };
    if record.expires_at <= Utc::now() {
        return Ok(None);
    }
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care::testutil::{seed_user, test_db};

    #[test]
    fn password_round_trip() {
        let hash = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("password123", "not-a-phc-string"));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn token_hash_is_deterministic() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), hash_token("other"));
    }

    #[test]
    fn issued_session_authenticates() {
        let conn = test_db();
        let user_id = seed_user(&conn, Role::Doctor);
        let profile = Uuid::new_v4();

        let token = issue_session(&conn, &user_id, Role::Doctor, Some(profile)).unwrap();
        let record = authenticate(&conn, &token).unwrap().unwrap();

        assert_eq!(record.user_id, user_id);
        assert_eq!(record.role, Role::Doctor);
        assert_eq!(record.profile_id, Some(profile));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let conn = test_db();
        assert!(authenticate(&conn, "no-such-token").unwrap().is_none());
    }

    #[test]
    fn expired_session_is_rejected() {
        let conn = test_db();
        let user_id = seed_user(&conn, Role::Patient);
        let token = generate_token();
        session::insert_session(
            &conn,
            &hash_token(&token),
            &SessionRecord {
                user_id,
                role: Role::Patient,
                profile_id: None,
                expires_at: Utc::now() - Duration::minutes(1),
            },
        )
        .unwrap();

        assert!(authenticate(&conn, &token).unwrap().is_none());
    }
}
