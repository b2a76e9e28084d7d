//! Shared JWT codec: the one place where tokens are minted and verified.
//!
//! The issuer (auth-service), the gateway filter and every per-service filter
//! link this module, so the secret, the algorithm and the claim names cannot
//! drift between participants.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::Role;

/// Claims embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email — the subject identifying the principal.
    pub sub: String,
    /// Role name; absent means no role asserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingCredential,
    #[error("malformed token")]
    MalformedToken,
    #[error("token signature verification failed")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
}

/// Mint a signed HS256 token for a verified identity.
///
/// `exp` is `iat + ttl_seconds`; nothing is persisted, a token reissued on
/// every login carries no cross-token state.
pub fn issue_token(email: &str, role: Role, secret: &str, ttl_seconds: u64) -> anyhow::Result<String> {
    if email.is_empty() {
        anyhow::bail!("Cannot issue a token for an empty email");
    }
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: email.to_string(),
        role: Some(role.to_string()),
        iat: now,
        exp: now + ttl_seconds as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify signature, structure and expiry of a token and return its claims.
///
/// Expiry is compared against the current time with zero leeway (the library
/// default of 60 s is deliberately overridden).
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        _ => AuthError::MalformedToken,
    })?;

    if data.claims.sub.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(data.claims)
}

/// Extract the raw token from an `Authorization: Bearer <token>` header value.
/// Any other scheme is treated the same as a missing header.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredential)
}

/// Normalize a role claim into an authority string: uppercase with a single
/// `ROLE_` prefix (`"recruiter"` → `"ROLE_RECRUITER"`, `"ROLE_CANDIDATE"`
/// stays as-is).
pub fn role_authority(role: &str) -> String {
    let upper = role.to_uppercase();
    if upper.starts_with("ROLE_") {
        upper
    } else {
        format!("ROLE_{upper}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn raw_claims(sub: &str, role: Option<&str>, iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role: role.map(|r| r.to_string()),
            iat: iat as usize,
            exp: exp as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issue_then_verify_recovers_email_and_role() {
        let token = issue_token("ana@example.com", Role::Recruiter, SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.role.as_deref(), Some("RECRUITER"));
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn issue_rejects_empty_email() {
        assert!(issue_token("", Role::Candidate, SECRET, 3600).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = issue_token("bob@example.com", Role::Candidate, SECRET, 3600).unwrap();
        // Flip one character of the signature segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let sig = parts[2].clone();
        let flipped = if sig.starts_with('A') {
            sig.replacen('A', "B", 1)
        } else {
            format!("A{}", &sig[1..])
        };
        parts[2] = flipped;
        let tampered = parts.join(".");
        assert_eq!(verify_token(&tampered, SECRET), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("bob@example.com", Role::Candidate, SECRET, 3600).unwrap();
        assert_eq!(verify_token(&token, "other-secret"), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn expired_token_is_rejected_with_zero_leeway() {
        let now = Utc::now().timestamp();
        // Expired one second ago — would still pass under the default 60 s leeway.
        let token = raw_claims("bob@example.com", Some("CANDIDATE"), now - 3600, now - 1);
        assert_eq!(verify_token(&token, SECRET), Err(AuthError::Expired));
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(verify_token("not-a-token", SECRET), Err(AuthError::MalformedToken));
        assert_eq!(verify_token("a.b.c", SECRET), Err(AuthError::MalformedToken));
    }

    #[test]
    fn empty_subject_is_malformed() {
        let now = Utc::now().timestamp();
        let token = raw_claims("", Some("CANDIDATE"), now, now + 60);
        assert_eq!(verify_token(&token, SECRET), Err(AuthError::MalformedToken));
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("Basic xyz")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::MissingCredential));
        assert_eq!(bearer_token(None), Err(AuthError::MissingCredential));
    }

    #[test]
    fn authority_normalization() {
        assert_eq!(role_authority("recruiter"), "ROLE_RECRUITER");
        assert_eq!(role_authority("CANDIDATE"), "ROLE_CANDIDATE");
        assert_eq!(role_authority("ROLE_RECRUITER"), "ROLE_RECRUITER");
        assert_eq!(role_authority("role_candidate"), "ROLE_CANDIDATE");
    }
}
