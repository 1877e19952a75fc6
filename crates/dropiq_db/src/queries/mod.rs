//! Database query functions.
//!
//! Organized by domain:
//! - `user`: users, linked wallets and wallet sign-in nonces
//! - `airdrop`: airdrop CRUD and moderation
//! - `campaign`: paid campaigns and payment state
//! - `strategy`: strategies, ratings, comments, tips
//! - `blacklist`: malicious domains and contracts
//! - `automation`: automated tasks
//! - `audit`: admin audit trail

mod airdrop;
mod audit;
mod automation;
mod blacklist;
mod campaign;
mod strategy;
mod user;

pub use airdrop::*;
pub use audit::*;
pub use automation::*;
pub use blacklist::*;
pub use campaign::*;
pub use strategy::*;
pub use user::*;
