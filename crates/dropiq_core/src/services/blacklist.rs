//! Blacklist administration and public lookups.

use chrono::Utc;
use dropiq_auth::normalize_address;
use dropiq_db::{queries, BlacklistEntry, BlacklistType, DbError, DropiqDb, User};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::security::domain_candidates;
use super::{audit, optional_text, require_admin, required_text};
use crate::error::{CoreError, CoreResult};
use crate::scoring::extract_host;

const MANUAL_SOURCE: &str = "manual";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlacklistEntry {
    pub entry_type: BlacklistType,
    pub value: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistCheck {
    pub blacklisted: bool,
    pub entry: Option<BlacklistEntry>,
}

/// Canonical stored form: lowercase host, or lowercase `0x` address.
fn normalize_value(entry_type: BlacklistType, raw: &str) -> CoreResult<String> {
    let value = required_text("value", raw, 255)?;
    match entry_type {
        BlacklistType::Domain => {
            let host = extract_host(&value);
            if host.is_empty() || !host.contains('.') || host.contains('/') {
                return Err(CoreError::validation("value", "must be a domain or URL"));
            }
            Ok(host)
        }
        BlacklistType::ContractAddress => normalize_address(&value).map_err(|_| {
            CoreError::validation("value", "must be a 0x-prefixed 20-byte hex address")
        }),
    }
}

#[derive(Debug, Clone)]
pub struct BlacklistService {
    db: DropiqDb,
}

impl BlacklistService {
    pub fn new(db: DropiqDb) -> Self {
        Self { db }
    }

    pub async fn list(&self, admin: &User, entry_type: Option<BlacklistType>) -> CoreResult<Vec<BlacklistEntry>> {
        require_admin(admin)?;
        Ok(queries::list_blacklist(self.db.pool(), entry_type).await?)
    }

    pub async fn add(&self, admin: &User, input: &NewBlacklistEntry) -> CoreResult<BlacklistEntry> {
        require_admin(admin)?;
        let now = Utc::now();
        let entry = BlacklistEntry {
            id: Uuid::new_v4().to_string(),
            entry_type: input.entry_type,
            value: normalize_value(input.entry_type, &input.value)?,
            source: optional_text("source", input.source.as_deref(), 80)?
                .unwrap_or_else(|| MANUAL_SOURCE.to_string()),
            reason: optional_text("reason", input.reason.as_deref(), 1000)?,
            added_by: Some(admin.id.clone()),
            created_at: now,
            updated_at: now,
        };

        queries::create_blacklist_entry(self.db.pool(), &entry)
            .await
            .map_err(|e| match e {
                DbError::AlreadyExists { .. } => {
                    CoreError::Conflict(format!("{} is already blacklisted", entry.value))
                }
                other => other.into(),
            })?;
        info!(entry_type = %entry.entry_type, value = %entry.value, "Blacklist entry added");
        audit::record(
            self.db.pool(),
            Some(&admin.id),
            "blacklist.add",
            "blacklist",
            Some(&entry.id),
            Some(entry.value.clone()),
        )
        .await;
        Ok(entry)
    }

    pub async fn remove(&self, admin: &User, id: &str) -> CoreResult<()> {
        require_admin(admin)?;
        if !queries::delete_blacklist_entry(self.db.pool(), id).await? {
            return Err(CoreError::not_found("BlacklistEntry", id));
        }
        info!(entry_id = %id, "Blacklist entry removed");
        audit::record(self.db.pool(), Some(&admin.id), "blacklist.remove", "blacklist", Some(id), None).await;
        Ok(())
    }

    /// Public lookup. URLs are reduced to their host; parent domains also match.
    pub async fn check(&self, value: &str) -> CoreResult<BlacklistCheck> {
        let value = required_text("value", value, 2048)?;
        let pool = self.db.pool();

        let entry = if value.starts_with("0x") || value.starts_with("0X") {
            queries::find_blacklisted_any(pool, &value).await?
        } else {
            let host = extract_host(&value);
            let mut found = None;
            for candidate in domain_candidates(&host) {
                found = queries::find_blacklisted(pool, BlacklistType::Domain, candidate).await?;
                if found.is_some() {
                    break;
                }
            }
            found
        };

        Ok(BlacklistCheck {
            blacklisted: entry.is_some(),
            entry,
        })
    }
}
