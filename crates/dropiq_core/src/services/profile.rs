//! Profile and linked-wallet management for the signed-in user.

use chrono::Utc;
use dropiq_auth::normalize_address;
use dropiq_db::{queries, DbError, DropiqDb, User, Wallet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWallet {
    pub address: String,
    #[serde(default)]
    pub chain_id: Option<i64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileService {
    db: DropiqDb,
}

impl ProfileService {
    pub fn new(db: DropiqDb) -> Self {
        Self { db }
    }

    pub async fn get(&self, user_id: &str) -> CoreResult<User> {
        queries::get_user(self.db.pool(), user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))
    }

    pub async fn update(&self, user: &User, update: &ProfileUpdate) -> CoreResult<User> {
        let display_name = super::optional_text("display_name", update.display_name.as_deref(), 64)?;
        let bio = super::optional_text("bio", update.bio.as_deref(), 1000)?;
        let avatar_url = match update.avatar_url.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => Some(super::http_url("avatar_url", url)?),
            None => None,
        };

        queries::update_user_profile(
            self.db.pool(),
            &user.id,
            display_name.as_deref(),
            bio.as_deref(),
            avatar_url.as_deref(),
        )
        .await?;
        self.get(&user.id).await
    }

    pub async fn wallets(&self, user: &User) -> CoreResult<Vec<Wallet>> {
        Ok(queries::list_wallets(self.db.pool(), &user.id).await?)
    }

    /// Link a wallet. The first wallet becomes primary.
    pub async fn add_wallet(&self, user: &User, input: &NewWallet) -> CoreResult<Wallet> {
        let address = normalize_address(&input.address).map_err(|_| {
            CoreError::validation("address", "must be a 0x-prefixed 20-byte hex address")
        })?;
        let chain_id = input.chain_id.unwrap_or(1);
        if chain_id <= 0 {
            return Err(CoreError::validation("chain_id", "must be positive"));
        }
        let label = super::optional_text("label", input.label.as_deref(), 64)?;
        let is_primary = queries::list_wallets(self.db.pool(), &user.id)
            .await?
            .is_empty();

        let wallet = Wallet {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            address,
            chain_id,
            label,
            is_primary,
            created_at: Utc::now(),
        };
        queries::create_wallet(self.db.pool(), &wallet)
            .await
            .map_err(|e| match e {
                DbError::AlreadyExists { .. } => {
                    CoreError::Conflict("wallet is already linked to an account".to_string())
                }
                other => other.into(),
            })?;
        Ok(wallet)
    }

    pub async fn remove_wallet(&self, user: &User, wallet_id: &str) -> CoreResult<()> {
        if queries::delete_wallet(self.db.pool(), &user.id, wallet_id).await? {
            Ok(())
        } else {
            Err(CoreError::not_found("Wallet", wallet_id))
        }
    }
}
