//! Minimal HS256 JWT utilities.
//!
//! Notes:
//! - Only supports JSON objects for header/payload.
//! - Uses base64url encoding WITHOUT padding.
//! - Performs signature verification using `Hmac::verify_slice`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::util::now_ts;

pub const ACCESS_TTL_SECS: i64 = 3600;
pub const REFRESH_TTL_SECS: i64 = 60 * 60 * 24 * 30;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("invalid token format")]
    Format,
    #[error("invalid signature")]
    Signature,
    #[error("token expired")]
    Expired,
    #[error("wrong token type")]
    WrongType,
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Session claims carried by both token kinds; `typ` distinguishes
/// "access" from "refresh".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, JwtError> {
    URL_SAFE_NO_PAD.decode(s.as_bytes()).map_err(|_| JwtError::Format)
}

/// Encode claims as an HS256-signed JWT.
pub fn encode_hs256<T: Serialize>(secret: &[u8], claims: &T) -> Result<String, JwtError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };

    let header_b64 = b64url_encode(&serde_json::to_vec(&header)?);
    let claims_b64 = b64url_encode(&serde_json::to_vec(claims)?);
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret).map_err(|_| JwtError::Signature)?;
    mac.update(signing_input.as_bytes());
    let sig_b64 = b64url_encode(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{sig_b64}"))
}

/// Decode an HS256 JWT and verify its signature.
///
/// Does not validate `exp`; callers must do that.
pub fn decode_hs256<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T, JwtError> {
    let token = token.replace(char::is_whitespace, "");
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(JwtError::Format);
    };
    if parts.next().is_some() {
        return Err(JwtError::Format);
    }

    let header: JwtHeader = serde_json::from_slice(&b64url_decode(header_b64)?)?;
    if header.alg != "HS256" || header.typ != "JWT" {
        return Err(JwtError::Format);
    }

    let signing_input = format!("{header_b64}.{payload_b64}");
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret).map_err(|_| JwtError::Signature)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&b64url_decode(sig_b64)?)
        .map_err(|_| JwtError::Signature)?;

    Ok(serde_json::from_slice(&b64url_decode(payload_b64)?)?)
}

/// Mint the access/refresh pair for a resolved account.
pub fn issue_pair(secret: &[u8], user_id: i64, email: &str) -> Result<TokenPair, JwtError> {
    let now = now_ts();

    let access = encode_hs256(
        secret,
        &Claims {
            sub: user_id,
            email: email.to_string(),
            typ: "access".to_string(),
            iat: now,
            exp: now + ACCESS_TTL_SECS,
        },
    )?;
    let refresh = encode_hs256(
        secret,
        &Claims {
            sub: user_id,
            email: email.to_string(),
            typ: "refresh".to_string(),
            iat: now,
            exp: now + REFRESH_TTL_SECS,
        },
    )?;

    Ok(TokenPair { access, refresh })
}

/// Verify an access token: signature, type, and expiry.
pub fn verify_access(secret: &[u8], token: &str) -> Result<Claims, JwtError> {
    let claims: Claims = decode_hs256(secret, token)?;

    if claims.typ != "access" {
        return Err(JwtError::WrongType);
    }
    if claims.exp <= now_ts() {
        return Err(JwtError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn pair_round_trips() {
        let pair = issue_pair(SECRET, 7, "a@b.com").unwrap();

        let claims = verify_access(SECRET, &pair.access).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let pair = issue_pair(SECRET, 7, "a@b.com").unwrap();

        assert!(matches!(
            verify_access(SECRET, &pair.refresh),
            Err(JwtError::WrongType)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let pair = issue_pair(SECRET, 7, "a@b.com").unwrap();

        assert!(matches!(
            verify_access(b"other-secret", &pair.access),
            Err(JwtError::Signature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: 7,
            email: "a@b.com".to_string(),
            typ: "access".to_string(),
            iat: now_ts() - 7200,
            exp: now_ts() - 3600,
        };
        let token = encode_hs256(SECRET, &claims).unwrap();

        assert!(matches!(
            verify_access(SECRET, &token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let pair = issue_pair(SECRET, 7, "a@b.com").unwrap();
        let mut parts: Vec<&str> = pair.access.split('.').collect();

        let forged = URL_SAFE_NO_PAD.encode(b"{\"sub\":1}");
        parts[1] = &forged;
        let token = parts.join(".");

        assert!(verify_access(SECRET, &token).is_err());
    }
}
