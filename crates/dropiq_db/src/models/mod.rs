//! Database models.
//!
//! These structs map directly to database tables via sqlx.

mod airdrop;
mod audit;
mod automation;
mod blacklist;
mod campaign;
mod strategy;
mod user;

pub use airdrop::{Airdrop, AirdropFilter, AirdropStatus};
pub use audit::AuditEvent;
pub use automation::{ApprovalStatus, AutomatedTask, ExecutionMode, TaskStatus, TaskType};
pub use blacklist::{BlacklistEntry, BlacklistType};
pub use campaign::{Campaign, CampaignStatus, PaymentStatus};
pub use strategy::{
    Strategy, StrategyComment, StrategyFilter, StrategyRating, StrategySort, StrategyTip,
};
pub use user::{User, UserRole, Wallet, WalletNonce};
