//! DropIQ Auth - credential primitives for the hybrid sign-in flow.
//!
//! This crate holds the stateless building blocks the services compose:
//! - Argon2 password hashing
//! - HS256 bearer tokens
//! - EIP-191 `personal_sign` recovery for wallet sign-in
//! - RFC 6238 TOTP for two-factor authentication
//!
//! Nothing here touches the database; persistence of users, nonces and
//! secrets lives in `dropiq-db`.

pub mod error;
pub mod password;
pub mod token;
pub mod totp;
pub mod wallet;

pub use error::{AuthError, AuthResult};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};
pub use totp::Totp;
pub use wallet::{
    generate_nonce, normalize_address, recover_address, sign_in_message, verify_signature,
};
