//! Fixtures shared by the query tests.

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::*;

pub fn sample_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4().to_string(),
        email: Some(email.to_lowercase()),
        password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string()),
        display_name: None,
        bio: None,
        avatar_url: None,
        role: UserRole::User,
        two_factor_secret: None,
        two_factor_enabled: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_wallet(user_id: &str, address: &str) -> Wallet {
    Wallet {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        address: address.to_string(),
        chain_id: 1,
        label: None,
        is_primary: true,
        created_at: Utc::now(),
    }
}

pub fn sample_airdrop(name: &str, slug: &str) -> Airdrop {
    let now = Utc::now();
    Airdrop {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(format!("{name} airdrop")),
        project_url: Some(format!("https://{slug}.io")),
        contract_address: None,
        chain_id: 1,
        category: Some("defi".to_string()),
        status: AirdropStatus::Pending,
        requirements: Json(serde_json::json!({ "min_transactions": 5 })),
        estimated_value_usd: Some(500.0),
        deadline: None,
        submitted_by: None,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_campaign(airdrop_id: &str, owner_id: &str, session_id: &str) -> Campaign {
    let now = Utc::now();
    Campaign {
        id: Uuid::new_v4().to_string(),
        airdrop_id: airdrop_id.to_string(),
        owner_id: owner_id.to_string(),
        title: "Featured placement".to_string(),
        budget_cents: 9_900,
        currency: "usd".to_string(),
        duration_days: 7,
        status: CampaignStatus::PendingPayment,
        payment_status: PaymentStatus::Unpaid,
        payment_session_id: Some(session_id.to_string()),
        payment_intent_id: None,
        rejection_reason: None,
        approved_at: None,
        starts_at: None,
        ends_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_strategy(author_id: &str, title: &str) -> Strategy {
    let now = Utc::now();
    Strategy {
        id: Uuid::new_v4().to_string(),
        author_id: author_id.to_string(),
        title: title.to_string(),
        description: None,
        content: "1. bridge\n2. swap".to_string(),
        requirements: Json(vec!["0.05 ETH".to_string()]),
        airdrop_id: None,
        is_public: true,
        original_strategy_id: None,
        copy_count: 0,
        rating_sum: 0,
        rating_count: 0,
        tip_total_cents: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_blacklist_entry(entry_type: BlacklistType, value: &str) -> BlacklistEntry {
    let now = Utc::now();
    BlacklistEntry {
        id: Uuid::new_v4().to_string(),
        entry_type,
        value: value.to_string(),
        source: "manual".to_string(),
        reason: Some("reported drainer".to_string()),
        added_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_task(user_id: &str, mode: ExecutionMode) -> AutomatedTask {
    let now = Utc::now();
    AutomatedTask {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        airdrop_id: None,
        task_type: TaskType::Swap,
        execution_mode: mode,
        approval_status: mode.initial_approval(),
        status: TaskStatus::Queued,
        payload: Json(serde_json::json!({ "amount": "0.1" })),
        result: None,
        scheduled_at: None,
        created_at: now,
        updated_at: now,
    }
}
