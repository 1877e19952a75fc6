//! Community strategy models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// A user-authored farming strategy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Strategy {
    /// Unique identifier
    pub id: String,

    /// Author
    pub author_id: String,

    /// Short title
    pub title: String,

    /// Summary shown in listings
    pub description: Option<String>,

    /// Full strategy body (markdown)
    pub content: String,

    /// Requirement checklist
    pub requirements: Json<Vec<String>>,

    /// Airdrop this strategy targets, if any
    pub airdrop_id: Option<String>,

    /// Visible to other users
    pub is_public: bool,

    /// Source strategy when this one is a copy
    pub original_strategy_id: Option<String>,

    /// Number of times this strategy was copied
    pub copy_count: i64,

    /// Sum of all ratings
    pub rating_sum: i64,

    /// Number of ratings
    pub rating_count: i64,

    /// Sum of tip amounts in minor units. Nominal only: tips in
    /// different currencies are added without conversion.
    pub tip_total_cents: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    /// Mean rating, or None if unrated.
    pub fn average_rating(&self) -> Option<f64> {
        (self.rating_count > 0).then(|| self.rating_sum as f64 / self.rating_count as f64)
    }
}

/// Sort order for strategy listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategySort {
    /// Highest average rating first
    Rating,
    /// Newest first
    #[default]
    Recent,
    /// Most copied first
    Popular,
}

/// Filter for strategy listings.
#[derive(Debug, Clone, Default)]
pub struct StrategyFilter {
    pub airdrop_id: Option<String>,
    pub author_id: Option<String>,
    /// Include this user's private strategies alongside public ones
    pub viewer_id: Option<String>,
    pub sort: StrategySort,
    pub limit: i64,
    pub offset: i64,
}

/// A user's 1-5 rating of a strategy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StrategyRating {
    pub strategy_id: String,
    pub user_id: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a strategy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StrategyComment {
    pub id: String,
    pub strategy_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tip sent to a strategy author.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StrategyTip {
    pub id: String,
    pub strategy_id: String,
    pub from_user_id: String,
    pub amount_cents: i64,
    pub currency: String,
    /// On-chain transaction hash when tipped in crypto
    pub tx_hash: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
