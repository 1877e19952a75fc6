//! DropIQ Database Layer
//!
//! SQLite-based storage for users, airdrops, campaigns, strategies,
//! blacklist entries and automated tasks.
//!
//! # Architecture
//!
//! - **Plain query functions** - every query takes a `&SqlitePool`, no repository objects
//! - **Embedded migrations** - schema lives in `migrations/` and runs on open
//! - **Constraints in the schema** - uniqueness (slug, name, email, wallet address)
//!   is enforced by SQLite and surfaces as [`DbError::AlreadyExists`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use dropiq_db::{DropiqDb, queries};
//!
//! let db = DropiqDb::open("data/dropiq.db").await?;
//! let airdrop = queries::get_airdrop_by_slug(db.pool(), "layerzero").await?;
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod queries;

#[cfg(test)]
mod test_support;

pub use connection::{DbStats, DropiqDb};
pub use error::{DbError, DbResult};

pub use models::{
    Airdrop, AirdropFilter, AirdropStatus, ApprovalStatus, AuditEvent, AutomatedTask,
    BlacklistEntry, BlacklistType, Campaign, CampaignStatus, ExecutionMode, PaymentStatus,
    Strategy, StrategyComment, StrategyFilter, StrategyRating, StrategySort, StrategyTip,
    TaskStatus, TaskType, User, UserRole, Wallet, WalletNonce,
};

/// Re-exported so downstream crates can build models without depending on sqlx.
pub use sqlx::types::Json;
pub use sqlx::SqlitePool;
