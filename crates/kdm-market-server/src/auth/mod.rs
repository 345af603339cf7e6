//! One-time-code authentication.
//!
//! A client asks for a code ([`code::request_code`]), receives it out of
//! band, and exchanges it for a JWT pair ([`account::verify_code`]). The
//! ephemeral store is the single authority on code expiry; database rows
//! only record issuance and consumption.

pub mod account;
pub mod code;
pub mod rate_limit;

pub(crate) fn code_key(email: &str) -> String {
    format!("verification_code:{email}")
}
