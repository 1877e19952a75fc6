//! Automated task queue with an approval gate.
//!
//! Tasks are records only: execution happens elsewhere and reports back
//! through [`AutomationService::update_status`].

use chrono::{DateTime, Utc};
use dropiq_db::{
    queries, ApprovalStatus, AutomatedTask, DropiqDb, ExecutionMode, Json, TaskStatus, TaskType,
    User,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::optional_text;
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub task_type: TaskType,
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub airdrop_id: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AutomationService {
    db: DropiqDb,
}

impl AutomationService {
    pub fn new(db: DropiqDb) -> Self {
        Self { db }
    }

    pub async fn list(&self, user: &User, status: Option<TaskStatus>) -> CoreResult<Vec<AutomatedTask>> {
        Ok(queries::list_tasks(self.db.pool(), &user.id, status).await?)
    }

    /// Queue a task. Automatic tasks skip approval; the rest wait for it.
    pub async fn create(&self, user: &User, input: &NewTask) -> CoreResult<AutomatedTask> {
        let payload = input.payload.clone().unwrap_or_else(|| serde_json::json!({}));
        if !payload.is_object() {
            return Err(CoreError::validation("payload", "must be a JSON object"));
        }
        if let Some(airdrop_id) = &input.airdrop_id {
            if queries::get_airdrop(self.db.pool(), airdrop_id).await?.is_none() {
                return Err(CoreError::not_found("Airdrop", airdrop_id.as_str()));
            }
        }

        let now = Utc::now();
        let task = AutomatedTask {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            airdrop_id: input.airdrop_id.clone(),
            task_type: input.task_type,
            execution_mode: input.execution_mode,
            approval_status: input.execution_mode.initial_approval(),
            status: TaskStatus::Queued,
            payload: Json(payload),
            result: None,
            scheduled_at: input.scheduled_at,
            created_at: now,
            updated_at: now,
        };
        queries::create_task(self.db.pool(), &task).await?;
        info!(
            task_id = %task.id,
            task_type = ?task.task_type,
            approval = ?task.approval_status,
            "Automation task queued"
        );
        Ok(task)
    }

    /// Tasks are private to their owner; anyone else gets not found.
    async fn owned(&self, user: &User, id: &str) -> CoreResult<AutomatedTask> {
        queries::get_task(self.db.pool(), id)
            .await?
            .filter(|t| t.user_id == user.id)
            .ok_or_else(|| CoreError::not_found("AutomatedTask", id))
    }

    pub async fn get(&self, user: &User, id: &str) -> CoreResult<AutomatedTask> {
        self.owned(user, id).await
    }

    async fn decide(&self, user: &User, id: &str, decision: ApprovalStatus) -> CoreResult<AutomatedTask> {
        let task = self.owned(user, id).await?;
        if task.approval_status != ApprovalStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "task is not awaiting approval ({:?})",
                task.approval_status
            )));
        }
        queries::set_task_approval(self.db.pool(), id, decision).await?;
        info!(task_id = %id, decision = ?decision, "Automation task decided");
        self.owned(user, id).await
    }

    pub async fn approve(&self, user: &User, id: &str) -> CoreResult<AutomatedTask> {
        self.decide(user, id, ApprovalStatus::Approved).await
    }

    pub async fn reject(&self, user: &User, id: &str) -> CoreResult<AutomatedTask> {
        self.decide(user, id, ApprovalStatus::Rejected).await
    }

    /// Move a task along its lifecycle; only legal transitions are accepted.
    pub async fn update_status(&self, user: &User, id: &str, update: &StatusUpdate) -> CoreResult<AutomatedTask> {
        let task = self.owned(user, id).await?;
        if task.status.is_terminal() {
            return Err(CoreError::Conflict(format!("task is already {}", task.status)));
        }
        if !task.status.can_transition_to(update.status) {
            return Err(CoreError::Conflict(format!(
                "cannot move task from {} to {}",
                task.status, update.status
            )));
        }
        if update.status == TaskStatus::Running && !task.approval_status.allows_execution() {
            return Err(CoreError::Conflict("task has not been approved".to_string()));
        }

        let result = optional_text("result", update.result.as_deref(), 5000)?;
        queries::set_task_status(self.db.pool(), id, update.status, result.as_deref()).await?;
        info!(task_id = %id, from = %task.status, to = %update.status, "Automation task status changed");
        self.owned(user, id).await
    }

    pub async fn delete(&self, user: &User, id: &str) -> CoreResult<()> {
        self.owned(user, id).await?;
        queries::delete_task(self.db.pool(), id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, test_db};
    use dropiq_db::UserRole;
    use pretty_assertions::assert_eq;

    fn task(mode: ExecutionMode) -> NewTask {
        NewTask {
            task_type: TaskType::Swap,
            execution_mode: mode,
            airdrop_id: None,
            payload: Some(serde_json::json!({ "amount": "0.01" })),
            scheduled_at: None,
        }
    }

    fn status(status: TaskStatus) -> StatusUpdate {
        StatusUpdate { status, result: None }
    }

    #[tokio::test]
    async fn test_initial_approval_by_mode() {
        let db = test_db().await;
        let user = create_user(&db, "user@example.com", UserRole::User).await;
        let service = AutomationService::new(db);

        let auto = service.create(&user, &task(ExecutionMode::Automatic)).await.unwrap();
        assert_eq!(auto.approval_status, ApprovalStatus::NotRequired);
        let semi = service.create(&user, &task(ExecutionMode::SemiAutomatic)).await.unwrap();
        assert_eq!(semi.approval_status, ApprovalStatus::Pending);
        let manual = service.create(&user, &task(ExecutionMode::Manual)).await.unwrap();
        assert_eq!(manual.approval_status, ApprovalStatus::Pending);
        assert_eq!(manual.status, TaskStatus::Queued);
    }

    #[tokio::test]
    async fn test_approval_only_when_pending() {
        let db = test_db().await;
        let user = create_user(&db, "user@example.com", UserRole::User).await;
        let service = AutomationService::new(db);

        let auto = service.create(&user, &task(ExecutionMode::Automatic)).await.unwrap();
        assert!(matches!(
            service.approve(&user, &auto.id).await,
            Err(CoreError::Conflict(_))
        ));

        let semi = service.create(&user, &task(ExecutionMode::SemiAutomatic)).await.unwrap();
        let rejected = service.reject(&user, &semi.id).await.unwrap();
        assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
        assert!(matches!(
            service.approve(&user, &semi.id).await,
            Err(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = test_db().await;
        let user = create_user(&db, "user@example.com", UserRole::User).await;
        let service = AutomationService::new(db);

        let semi = service.create(&user, &task(ExecutionMode::SemiAutomatic)).await.unwrap();
        // Not approved yet.
        assert!(matches!(
            service.update_status(&user, &semi.id, &status(TaskStatus::Running)).await,
            Err(CoreError::Conflict(_))
        ));
        service.approve(&user, &semi.id).await.unwrap();
        service
            .update_status(&user, &semi.id, &status(TaskStatus::Running))
            .await
            .unwrap();
        let done = service
            .update_status(
                &user,
                &semi.id,
                &StatusUpdate {
                    status: TaskStatus::Completed,
                    result: Some("tx 0xabc".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.result.as_deref(), Some("tx 0xabc"));

        // Terminal.
        match service.update_status(&user, &semi.id, &status(TaskStatus::Cancelled)).await {
            Err(CoreError::Conflict(message)) => assert_eq!(message, "task is already completed"),
            other => panic!("expected conflict, got {other:?}"),
        }

        let auto = service.create(&user, &task(ExecutionMode::Automatic)).await.unwrap();
        assert!(service
            .update_status(&user, &auto.id, &status(TaskStatus::Completed))
            .await
            .is_err());
        let cancelled = service
            .update_status(&user, &auto.id, &status(TaskStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_tasks_are_private() {
        let db = test_db().await;
        let owner = create_user(&db, "owner@example.com", UserRole::User).await;
        let other = create_user(&db, "other@example.com", UserRole::User).await;
        let service = AutomationService::new(db);
        let created = service.create(&owner, &task(ExecutionMode::Manual)).await.unwrap();

        assert!(matches!(
            service.delete(&other, &created.id).await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(service.list(&other, None).await.unwrap().is_empty());
        service.delete(&owner, &created.id).await.unwrap();
        assert!(service.list(&owner, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payload_must_be_object() {
        let db = test_db().await;
        let user = create_user(&db, "user@example.com", UserRole::User).await;
        let service = AutomationService::new(db);
        let mut input = task(ExecutionMode::Manual);
        input.payload = Some(serde_json::json!([1, 2]));
        assert!(matches!(
            service.create(&user, &input).await,
            Err(CoreError::Validation { .. })
        ));
    }
}
