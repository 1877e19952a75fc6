//! Airdrop submission, moderation and listing.

use chrono::{DateTime, Utc};
use dropiq_auth::normalize_address;
use dropiq_db::{
    queries, Airdrop, AirdropFilter, AirdropStatus, DbError, DropiqDb, Json, User,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{audit, optional_text, page_limit, require_admin, required_text};
use crate::error::{CoreError, CoreResult};
use crate::scoring::EligibilityRequirements;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAirdrop {
    pub name: String,
    /// Derived from the name when omitted
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub requirements: Option<serde_json::Value>,
    #[serde(default)]
    pub estimated_value_usd: Option<f64>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirdropPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub project_url: Option<String>,
    pub contract_address: Option<String>,
    pub chain_id: Option<i64>,
    pub category: Option<String>,
    pub requirements: Option<serde_json::Value>,
    pub estimated_value_usd: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirdropQuery {
    pub status: Option<AirdropStatus>,
    pub chain_id: Option<i64>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropPage {
    pub airdrops: Vec<Airdrop>,
    pub total: i64,
}

/// Lowercase, hyphen-separated ASCII slug.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn valid_slug(raw: &str) -> CoreResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() || slug.len() > 80 {
        return Err(CoreError::validation("slug", "must contain letters or digits (max 80)"));
    }
    Ok(slug)
}

fn valid_contract(raw: Option<&str>) -> CoreResult<Option<String>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(address) => normalize_address(address).map(Some).map_err(|_| {
            CoreError::validation("contract_address", "must be a 0x-prefixed 20-byte hex address")
        }),
        None => Ok(None),
    }
}

fn valid_requirements(value: serde_json::Value) -> CoreResult<serde_json::Value> {
    EligibilityRequirements::from_json(&value)
        .map_err(|e| CoreError::validation("requirements", e.to_string()))?;
    Ok(if value.is_null() { serde_json::json!({}) } else { value })
}

fn valid_chain(chain_id: i64) -> CoreResult<i64> {
    if chain_id <= 0 {
        return Err(CoreError::validation("chain_id", "must be positive"));
    }
    Ok(chain_id)
}

fn valid_value(value: Option<f64>) -> CoreResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(CoreError::validation(
            "estimated_value_usd",
            "must be a non-negative number",
        )),
        other => Ok(other),
    }
}

fn valid_url(value: Option<&str>) -> CoreResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(url) => super::http_url("project_url", url).map(Some),
        None => Ok(None),
    }
}

/// Approved airdrops are public; others only to admins and the submitter.
pub(crate) fn visible_to(airdrop: &Airdrop, viewer: Option<&User>) -> bool {
    airdrop.status == AirdropStatus::Approved
        || viewer.is_some_and(|v| {
            v.is_admin() || airdrop.submitted_by.as_deref() == Some(v.id.as_str())
        })
}

/// Load an airdrop the viewer may see, hiding the rest as not found.
pub(crate) async fn load_visible(
    db: &DropiqDb,
    id: &str,
    viewer: Option<&User>,
) -> CoreResult<Airdrop> {
    queries::get_airdrop(db.pool(), id)
        .await?
        .filter(|a| visible_to(a, viewer))
        .ok_or_else(|| CoreError::not_found("Airdrop", id))
}

fn map_conflict(e: DbError) -> CoreError {
    match e {
        DbError::AlreadyExists { .. } => {
            CoreError::Conflict("an airdrop with this name or slug already exists".to_string())
        }
        other => other.into(),
    }
}

#[derive(Debug, Clone)]
pub struct AirdropService {
    db: DropiqDb,
}

impl AirdropService {
    pub fn new(db: DropiqDb) -> Self {
        Self { db }
    }

    /// List airdrops. Only admins may see statuses other than approved.
    pub async fn list(&self, viewer: Option<&User>, query: &AirdropQuery) -> CoreResult<AirdropPage> {
        let is_admin = viewer.is_some_and(User::is_admin);
        let status = if is_admin {
            query.status
        } else {
            Some(AirdropStatus::Approved)
        };

        let filter = AirdropFilter {
            status,
            chain_id: query.chain_id,
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            limit: page_limit(query.limit),
            offset: query.offset.unwrap_or(0).max(0),
        };

        Ok(AirdropPage {
            airdrops: queries::list_airdrops(self.db.pool(), &filter).await?,
            total: queries::count_airdrops(self.db.pool(), &filter).await?,
        })
    }

    /// Every approved airdrop, for ranking.
    pub async fn approved(&self) -> CoreResult<Vec<Airdrop>> {
        let filter = AirdropFilter {
            status: Some(AirdropStatus::Approved),
            limit: 500,
            ..Default::default()
        };
        Ok(queries::list_airdrops(self.db.pool(), &filter).await?)
    }

    /// Submit an airdrop for moderation.
    pub async fn submit(&self, user: &User, input: &NewAirdrop) -> CoreResult<Airdrop> {
        let name = required_text("name", &input.name, 120)?;
        let slug = valid_slug(input.slug.as_deref().unwrap_or(&name))?;

        if queries::find_airdrop_conflict(self.db.pool(), &slug, &name, None)
            .await?
            .is_some()
        {
            return Err(map_conflict(DbError::already_exists("Airdrop", slug)));
        }

        let now = Utc::now();
        let airdrop = Airdrop {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            description: optional_text("description", input.description.as_deref(), 5000)?,
            project_url: valid_url(input.project_url.as_deref())?,
            contract_address: valid_contract(input.contract_address.as_deref())?,
            chain_id: valid_chain(input.chain_id.unwrap_or(1))?,
            category: optional_text("category", input.category.as_deref(), 40)?
                .map(|c| c.to_lowercase()),
            status: AirdropStatus::Pending,
            requirements: Json(valid_requirements(
                input.requirements.clone().unwrap_or(serde_json::Value::Null),
            )?),
            estimated_value_usd: valid_value(input.estimated_value_usd)?,
            deadline: input.deadline,
            submitted_by: Some(user.id.clone()),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        queries::create_airdrop(self.db.pool(), &airdrop)
            .await
            .map_err(map_conflict)?;
        info!(airdrop_id = %airdrop.id, slug = %airdrop.slug, "Airdrop submitted");
        Ok(airdrop)
    }

    async fn load(&self, id: &str) -> CoreResult<Airdrop> {
        queries::get_airdrop(self.db.pool(), id)
            .await?
            .ok_or_else(|| CoreError::not_found("Airdrop", id))
    }

    pub async fn get(&self, viewer: Option<&User>, id: &str) -> CoreResult<Airdrop> {
        load_visible(&self.db, id, viewer).await
    }

    pub async fn update(&self, admin: &User, id: &str, patch: &AirdropPatch) -> CoreResult<Airdrop> {
        require_admin(admin)?;
        let mut airdrop = self.load(id).await?;

        if let Some(name) = &patch.name {
            airdrop.name = required_text("name", name, 120)?;
        }
        if let Some(slug) = &patch.slug {
            airdrop.slug = valid_slug(slug)?;
        }
        if patch.description.is_some() {
            airdrop.description = optional_text("description", patch.description.as_deref(), 5000)?;
        }
        if patch.project_url.is_some() {
            airdrop.project_url = valid_url(patch.project_url.as_deref())?;
        }
        if patch.contract_address.is_some() {
            airdrop.contract_address = valid_contract(patch.contract_address.as_deref())?;
        }
        if let Some(chain_id) = patch.chain_id {
            airdrop.chain_id = valid_chain(chain_id)?;
        }
        if patch.category.is_some() {
            airdrop.category = optional_text("category", patch.category.as_deref(), 40)?
                .map(|c| c.to_lowercase());
        }
        if let Some(requirements) = &patch.requirements {
            airdrop.requirements = Json(valid_requirements(requirements.clone())?);
        }
        if patch.estimated_value_usd.is_some() {
            airdrop.estimated_value_usd = valid_value(patch.estimated_value_usd)?;
        }
        if patch.deadline.is_some() {
            airdrop.deadline = patch.deadline;
        }

        if queries::find_airdrop_conflict(self.db.pool(), &airdrop.slug, &airdrop.name, Some(id))
            .await?
            .is_some()
        {
            return Err(map_conflict(DbError::already_exists("Airdrop", &airdrop.slug)));
        }

        airdrop.updated_at = Utc::now();
        queries::update_airdrop(self.db.pool(), &airdrop)
            .await
            .map_err(map_conflict)?;
        audit::record(self.db.pool(), Some(&admin.id), "airdrop.update", "airdrop", Some(id), None).await;
        Ok(airdrop)
    }

    pub async fn delete(&self, admin: &User, id: &str) -> CoreResult<()> {
        require_admin(admin)?;
        if !queries::delete_airdrop(self.db.pool(), id).await? {
            return Err(CoreError::not_found("Airdrop", id));
        }
        info!(airdrop_id = %id, "Airdrop deleted");
        audit::record(self.db.pool(), Some(&admin.id), "airdrop.delete", "airdrop", Some(id), None).await;
        Ok(())
    }

    pub async fn approve(&self, admin: &User, id: &str) -> CoreResult<Airdrop> {
        require_admin(admin)?;
        let airdrop = self.load(id).await?;
        if airdrop.status == AirdropStatus::Approved {
            return Err(CoreError::Conflict("airdrop is already approved".to_string()));
        }
        queries::set_airdrop_status(self.db.pool(), id, AirdropStatus::Approved, None).await?;
        info!(airdrop_id = %id, "Airdrop approved");
        audit::record(self.db.pool(), Some(&admin.id), "airdrop.approve", "airdrop", Some(id), None).await;
        self.load(id).await
    }

    pub async fn reject(&self, admin: &User, id: &str, reason: &str) -> CoreResult<Airdrop> {
        require_admin(admin)?;
        let reason = required_text("reason", reason, 1000)?;
        let airdrop = self.load(id).await?;
        if airdrop.status == AirdropStatus::Rejected {
            return Err(CoreError::Conflict("airdrop is already rejected".to_string()));
        }
        queries::set_airdrop_status(self.db.pool(), id, AirdropStatus::Rejected, Some(&reason))
            .await?;
        info!(airdrop_id = %id, "Airdrop rejected");
        audit::record(
            self.db.pool(),
            Some(&admin.id),
            "airdrop.reject",
            "airdrop",
            Some(id),
            Some(reason),
        )
        .await;
        self.load(id).await
    }
}
