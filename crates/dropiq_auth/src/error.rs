//! Error types for dropiq_auth.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur in auth operations.
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    /// Password hashing failed (bad parameters, malformed stored hash).
    #[error("Password hashing error: {0}")]
    #[diagnostic(code(dropiq_auth::password_hash))]
    PasswordHash(String),

    /// Token could not be issued or verified.
    #[error("Token error: {0}")]
    #[diagnostic(code(dropiq_auth::token))]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Not a `0x`-prefixed 20-byte hex address.
    #[error("Invalid wallet address: {0}")]
    #[diagnostic(code(dropiq_auth::invalid_address))]
    InvalidAddress(String),

    /// Signature is malformed or does not recover.
    #[error("Invalid signature: {0}")]
    #[diagnostic(code(dropiq_auth::invalid_signature))]
    InvalidSignature(String),

    /// TOTP secret could not be decoded.
    #[error("Invalid TOTP secret")]
    #[diagnostic(code(dropiq_auth::invalid_totp_secret))]
    InvalidTotpSecret,
}
