//! User, wallet and sign-in challenge models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user.
///
/// Users sign in with email/password, with a wallet signature, or both.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,

    /// Lowercased email (None for wallet-only users)
    pub email: Option<String>,

    /// Argon2 PHC string (None for wallet-only users)
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Public display name
    pub display_name: Option<String>,

    /// Profile bio
    pub bio: Option<String>,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Authorization role
    pub role: UserRole,

    /// Base32 TOTP secret, present once 2FA setup has started
    #[serde(skip_serializing, default)]
    pub two_factor_secret: Option<String>,

    /// Whether login requires a TOTP code
    pub two_factor_enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True if the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A wallet linked to a user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique identifier
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Lowercased `0x`-prefixed address (unique across users)
    pub address: String,

    /// EVM chain id the wallet is primarily used on
    pub chain_id: i64,

    /// Optional user label
    pub label: Option<String>,

    /// Whether this is the user's primary wallet
    pub is_primary: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One-time sign-in challenge for a wallet address.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WalletNonce {
    /// Lowercased address the nonce was issued for
    pub address: String,

    /// Random nonce embedded in the signed message
    pub nonce: String,

    /// After this instant the nonce is rejected
    pub expires_at: DateTime<Utc>,
}
