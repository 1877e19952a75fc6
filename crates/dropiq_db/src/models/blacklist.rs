//! Blacklist of known-malicious domains and contracts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A known-malicious domain or contract address.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Unique identifier
    pub id: String,

    /// Kind of value
    pub entry_type: BlacklistType,

    /// Normalized value: lowercase host or lowercase `0x` address
    pub value: String,

    /// Where the entry came from: 'manual', 'community', feed name, ...
    pub source: String,

    /// Why it was listed
    pub reason: Option<String>,

    /// Admin who added the entry
    pub added_by: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Kind of blacklisted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlacklistType {
    Domain,
    ContractAddress,
}

impl std::fmt::Display for BlacklistType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain => write!(f, "domain"),
            Self::ContractAddress => write!(f, "contract_address"),
        }
    }
}
