//! Community strategies: authoring, copying, ratings, comments and tips.

use chrono::Utc;
use dropiq_db::{
    queries, DropiqDb, Json, Strategy, StrategyComment, StrategyFilter, StrategyRating,
    StrategySort, StrategyTip, User,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{optional_text, page_limit, required_text};
use crate::error::{CoreError, CoreResult};

const MAX_REQUIREMENTS: usize = 50;
const MAX_TIP_CENTS: i64 = 10_000_000;

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStrategy {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub airdrop_id: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub airdrop_id: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyQuery {
    pub airdrop_id: Option<String>,
    pub author_id: Option<String>,
    pub sort: Option<StrategySort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTip {
    pub amount_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    /// Hash of the on-chain transfer, for crypto tips
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn valid_requirements(items: &[String]) -> CoreResult<Vec<String>> {
    if items.len() > MAX_REQUIREMENTS {
        return Err(CoreError::validation(
            "requirements",
            format!("at most {MAX_REQUIREMENTS} items"),
        ));
    }
    items
        .iter()
        .map(|item| required_text("requirements", item, 200))
        .collect()
}

fn valid_tx_hash(value: Option<&str>) -> CoreResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(hash) => {
            let hex = hash.strip_prefix("0x").unwrap_or_default();
            if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                Ok(Some(hash.to_lowercase()))
            } else {
                Err(CoreError::validation("tx_hash", "must be a 0x-prefixed 32-byte hex hash"))
            }
        }
        None => Ok(None),
    }
}

fn can_view(strategy: &Strategy, viewer: Option<&User>) -> bool {
    strategy.is_public || viewer.is_some_and(|v| v.is_admin() || v.id == strategy.author_id)
}

#[derive(Debug, Clone)]
pub struct StrategyService {
    db: DropiqDb,
}

impl StrategyService {
    pub fn new(db: DropiqDb) -> Self {
        Self { db }
    }

    /// Public strategies, plus the viewer's own private ones.
    pub async fn list(&self, viewer: Option<&User>, query: &StrategyQuery) -> CoreResult<Vec<Strategy>> {
        let filter = StrategyFilter {
            airdrop_id: query.airdrop_id.clone(),
            author_id: query.author_id.clone(),
            viewer_id: viewer.map(|v| v.id.clone()),
            sort: query.sort.unwrap_or_default(),
            limit: page_limit(query.limit),
            offset: query.offset.unwrap_or(0).max(0),
        };
        Ok(queries::list_strategies(self.db.pool(), &filter).await?)
    }

    async fn ensure_airdrop(&self, airdrop_id: Option<&str>) -> CoreResult<()> {
        if let Some(id) = airdrop_id {
            if queries::get_airdrop(self.db.pool(), id).await?.is_none() {
                return Err(CoreError::not_found("Airdrop", id));
            }
        }
        Ok(())
    }

    pub async fn create(&self, author: &User, input: &NewStrategy) -> CoreResult<Strategy> {
        let airdrop_id = input
            .airdrop_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        self.ensure_airdrop(airdrop_id).await?;

        let now = Utc::now();
        let strategy = Strategy {
            id: Uuid::new_v4().to_string(),
            author_id: author.id.clone(),
            title: required_text("title", &input.title, 120)?,
            description: optional_text("description", input.description.as_deref(), 500)?,
            content: required_text("content", &input.content, 20_000)?,
            requirements: Json(valid_requirements(&input.requirements)?),
            airdrop_id: airdrop_id.map(str::to_string),
            is_public: input.is_public,
            original_strategy_id: None,
            copy_count: 0,
            rating_sum: 0,
            rating_count: 0,
            tip_total_cents: 0,
            created_at: now,
            updated_at: now,
        };
        queries::create_strategy(self.db.pool(), &strategy).await?;
        info!(strategy_id = %strategy.id, author_id = %author.id, "Strategy created");
        Ok(strategy)
    }

    /// Private strategies are hidden as not found from everyone but the author and admins.
    pub async fn get(&self, viewer: Option<&User>, id: &str) -> CoreResult<Strategy> {
        queries::get_strategy(self.db.pool(), id)
            .await?
            .filter(|s| can_view(s, viewer))
            .ok_or_else(|| CoreError::not_found("Strategy", id))
    }

    async fn get_writable(&self, user: &User, id: &str) -> CoreResult<Strategy> {
        let strategy = self.get(Some(user), id).await?;
        if strategy.author_id != user.id && !user.is_admin() {
            return Err(CoreError::Forbidden("not the strategy author".to_string()));
        }
        Ok(strategy)
    }

    pub async fn update(&self, user: &User, id: &str, patch: &StrategyPatch) -> CoreResult<Strategy> {
        let mut strategy = self.get_writable(user, id).await?;

        if let Some(title) = &patch.title {
            strategy.title = required_text("title", title, 120)?;
        }
        if patch.description.is_some() {
            strategy.description = optional_text("description", patch.description.as_deref(), 500)?;
        }
        if let Some(content) = &patch.content {
            strategy.content = required_text("content", content, 20_000)?;
        }
        if let Some(requirements) = &patch.requirements {
            strategy.requirements = Json(valid_requirements(requirements)?);
        }
        if let Some(airdrop_id) = &patch.airdrop_id {
            let airdrop_id = Some(airdrop_id.trim()).filter(|v| !v.is_empty());
            self.ensure_airdrop(airdrop_id).await?;
            strategy.airdrop_id = airdrop_id.map(str::to_string);
        }
        if let Some(is_public) = patch.is_public {
            strategy.is_public = is_public;
        }

        strategy.updated_at = Utc::now();
        queries::update_strategy(self.db.pool(), &strategy).await?;
        Ok(strategy)
    }

    pub async fn delete(&self, user: &User, id: &str) -> CoreResult<()> {
        self.get_writable(user, id).await?;
        queries::delete_strategy(self.db.pool(), id).await?;
        info!(strategy_id = %id, "Strategy deleted");
        Ok(())
    }

    /// Copy a visible strategy into a private one owned by `user`.
    pub async fn copy(&self, user: &User, id: &str) -> CoreResult<Strategy> {
        let source = self.get(Some(user), id).await?;
        let now = Utc::now();
        let copy = Strategy {
            id: Uuid::new_v4().to_string(),
            author_id: user.id.clone(),
            is_public: false,
            original_strategy_id: Some(source.id.clone()),
            copy_count: 0,
            rating_sum: 0,
            rating_count: 0,
            tip_total_cents: 0,
            created_at: now,
            updated_at: now,
            ..source
        };
        queries::create_strategy(self.db.pool(), &copy).await?;
        queries::increment_copy_count(self.db.pool(), id).await?;
        info!(strategy_id = %copy.id, source_id = %id, "Strategy copied");
        Ok(copy)
    }

    /// Rate 1-5, replacing any earlier rating by the same user.
    pub async fn rate(&self, user: &User, id: &str, rating: i64) -> CoreResult<Strategy> {
        if !(1..=5).contains(&rating) {
            return Err(CoreError::validation("rating", "must be between 1 and 5"));
        }
        let strategy = self.get(Some(user), id).await?;
        if strategy.author_id == user.id {
            return Err(CoreError::validation("rating", "cannot rate your own strategy"));
        }

        let now = Utc::now();
        queries::upsert_rating(
            self.db.pool(),
            &StrategyRating {
                strategy_id: strategy.id.clone(),
                user_id: user.id.clone(),
                rating,
                created_at: now,
                updated_at: now,
            },
        )
        .await?;
        self.get(Some(user), id).await
    }

    pub async fn comments(&self, viewer: Option<&User>, id: &str) -> CoreResult<Vec<StrategyComment>> {
        self.get(viewer, id).await?;
        Ok(queries::list_comments(self.db.pool(), id).await?)
    }

    pub async fn add_comment(&self, user: &User, id: &str, input: &NewComment) -> CoreResult<StrategyComment> {
        self.get(Some(user), id).await?;
        let now = Utc::now();
        let comment = StrategyComment {
            id: Uuid::new_v4().to_string(),
            strategy_id: id.to_string(),
            author_id: user.id.clone(),
            body: required_text("body", &input.body, 2000)?,
            created_at: now,
            updated_at: now,
        };
        queries::create_comment(self.db.pool(), &comment).await?;
        Ok(comment)
    }

    pub async fn tip(&self, user: &User, id: &str, input: &NewTip) -> CoreResult<StrategyTip> {
        if !(1..=MAX_TIP_CENTS).contains(&input.amount_cents) {
            return Err(CoreError::validation(
                "amount_cents",
                format!("must be between 1 and {MAX_TIP_CENTS}"),
            ));
        }
        let strategy = self.get(Some(user), id).await?;
        if strategy.author_id == user.id {
            return Err(CoreError::validation("amount_cents", "cannot tip your own strategy"));
        }

        let currency = input.currency.as_deref().unwrap_or("usd").trim().to_lowercase();
        if currency.is_empty() || currency.len() > 10 || !currency.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::validation("currency", "must be a short currency code"));
        }

        let tip = StrategyTip {
            id: Uuid::new_v4().to_string(),
            strategy_id: strategy.id,
            from_user_id: user.id.clone(),
            amount_cents: input.amount_cents,
            currency,
            tx_hash: valid_tx_hash(input.tx_hash.as_deref())?,
            message: optional_text("message", input.message.as_deref(), 500)?,
            created_at: Utc::now(),
        };
        queries::create_tip(self.db.pool(), &tip).await?;
        info!(strategy_id = %id, amount_cents = tip.amount_cents, "Strategy tipped");
        Ok(tip)
    }

    pub async fn tips(&self, viewer: Option<&User>, id: &str) -> CoreResult<Vec<StrategyTip>> {
        self.get(viewer, id).await?;
        Ok(queries::list_tips(self.db.pool(), id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, test_db};
    use dropiq_db::UserRole;
    use pretty_assertions::assert_eq;

    fn input(title: &str, is_public: bool) -> NewStrategy {
        NewStrategy {
            title: title.to_string(),
            description: None,
            content: "1. Bridge\n2. Swap weekly".to_string(),
            requirements: vec!["bridge once".to_string()],
            airdrop_id: None,
            is_public,
        }
    }

    #[tokio::test]
    async fn test_visibility_and_listing() {
        let db = test_db().await;
        let author = create_user(&db, "author@example.com", UserRole::User).await;
        let reader = create_user(&db, "reader@example.com", UserRole::User).await;
        let service = StrategyService::new(db);

        service.create(&author, &input("Public", true)).await.unwrap();
        let private = service.create(&author, &input("Private", false)).await.unwrap();

        assert_eq!(service.list(None, &StrategyQuery::default()).await.unwrap().len(), 1);
        assert_eq!(service.list(Some(&author), &StrategyQuery::default()).await.unwrap().len(), 2);
        assert!(matches!(
            service.get(Some(&reader), &private.id).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_only_author_writes() {
        let db = test_db().await;
        let author = create_user(&db, "author@example.com", UserRole::User).await;
        let reader = create_user(&db, "reader@example.com", UserRole::User).await;
        let admin = create_user(&db, "admin@example.com", UserRole::Admin).await;
        let service = StrategyService::new(db);
        let strategy = service.create(&author, &input("Guide", true)).await.unwrap();

        let patch = StrategyPatch {
            title: Some("Better guide".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&reader, &strategy.id, &patch).await,
            Err(CoreError::Forbidden(_))
        ));
        assert_eq!(service.update(&author, &strategy.id, &patch).await.unwrap().title, "Better guide");
        service.delete(&admin, &strategy.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_tracks_lineage() {
        let db = test_db().await;
        let author = create_user(&db, "author@example.com", UserRole::User).await;
        let reader = create_user(&db, "reader@example.com", UserRole::User).await;
        let service = StrategyService::new(db);
        let source = service.create(&author, &input("Guide", true)).await.unwrap();

        let copy = service.copy(&reader, &source.id).await.unwrap();
        assert_eq!(copy.author_id, reader.id);
        assert!(!copy.is_public);
        assert_eq!(copy.original_strategy_id.as_deref(), Some(source.id.as_str()));
        assert_eq!(copy.content, source.content);

        let source = service.get(None, &source.id).await.unwrap();
        assert_eq!(source.copy_count, 1);
    }

    #[tokio::test]
    async fn test_rating_rules() {
        let db = test_db().await;
        let author = create_user(&db, "author@example.com", UserRole::User).await;
        let reader = create_user(&db, "reader@example.com", UserRole::User).await;
        let service = StrategyService::new(db);
        let strategy = service.create(&author, &input("Guide", true)).await.unwrap();

        assert!(matches!(
            service.rate(&author, &strategy.id, 5).await,
            Err(CoreError::Validation { .. })
        ));
        assert!(service.rate(&reader, &strategy.id, 6).await.is_err());

        service.rate(&reader, &strategy.id, 2).await.unwrap();
        let rated = service.rate(&reader, &strategy.id, 4).await.unwrap();
        assert_eq!(rated.rating_count, 1);
        assert_eq!(rated.average_rating(), Some(4.0));
    }

    #[tokio::test]
    async fn test_comments_and_tips() {
        let db = test_db().await;
        let author = create_user(&db, "author@example.com", UserRole::User).await;
        let reader = create_user(&db, "reader@example.com", UserRole::User).await;
        let service = StrategyService::new(db);
        let strategy = service.create(&author, &input("Guide", true)).await.unwrap();

        service
            .add_comment(&reader, &strategy.id, &NewComment { body: "Worked for me".into() })
            .await
            .unwrap();
        assert_eq!(service.comments(None, &strategy.id).await.unwrap().len(), 1);

        let tip = NewTip {
            amount_cents: 500,
            currency: None,
            tx_hash: None,
            message: Some("thanks".into()),
        };
        assert!(matches!(
            service.tip(&author, &strategy.id, &tip).await,
            Err(CoreError::Validation { .. })
        ));
        let zero = NewTip { amount_cents: 0, ..tip.clone() };
        assert!(service.tip(&reader, &strategy.id, &zero).await.is_err());
        let huge = NewTip { amount_cents: i64::MAX, ..tip.clone() };
        assert!(matches!(
            service.tip(&reader, &strategy.id, &huge).await,
            Err(CoreError::Validation { .. })
        ));

        service.tip(&reader, &strategy.id, &tip).await.unwrap();
        assert_eq!(service.get(None, &strategy.id).await.unwrap().tip_total_cents, 500);
        assert_eq!(service.tips(None, &strategy.id).await.unwrap().len(), 1);
    }

    #[test]
    fn test_tx_hash_validation() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(valid_tx_hash(Some(&hash)).unwrap(), Some(hash.clone()));
        assert!(valid_tx_hash(Some("0x1234")).is_err());
        assert_eq!(valid_tx_hash(None).unwrap(), None);
    }
}
