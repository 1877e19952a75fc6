//! Automated task models.
//!
//! Tasks describe on-chain or social chores a user wants performed for an
//! airdrop. Anything not in `automatic` mode needs explicit approval before
//! it may start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// A queued automation task.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AutomatedTask {
    /// Unique identifier
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Airdrop the task works towards
    pub airdrop_id: Option<String>,

    /// What kind of action
    pub task_type: TaskType,

    /// How much user involvement is required
    pub execution_mode: ExecutionMode,

    /// Approval gate state
    pub approval_status: ApprovalStatus,

    /// Execution state
    pub status: TaskStatus,

    /// Task parameters (amounts, routes, targets)
    pub payload: Json<serde_json::Value>,

    /// Outcome or failure message
    pub result: Option<String>,

    /// Earliest time the task should run
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Kind of automated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Swap,
    Bridge,
    Claim,
    Social,
    Custom,
}

/// How a task is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// User performs every step; task is a reminder
    Manual,
    /// Prepared automatically, user approves before it runs
    SemiAutomatic,
    /// Runs without approval
    Automatic,
}

impl ExecutionMode {
    /// Initial approval state for a task created in this mode.
    pub fn initial_approval(self) -> ApprovalStatus {
        match self {
            Self::Automatic => ApprovalStatus::NotRequired,
            Self::Manual | Self::SemiAutomatic => ApprovalStatus::Pending,
        }
    }
}

/// Approval gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    NotRequired,
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Whether a task in this approval state may start running.
    pub fn allows_execution(self) -> bool {
        matches!(self, Self::NotRequired | Self::Approved)
    }
}

/// Execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Queued, Running)
                | (Queued, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }

    /// True once the task can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(TaskStatus::Queued.can_transition_to(TaskStatus::Running));
        assert!(TaskStatus::Running.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Running));
        assert!(!TaskStatus::Queued.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_initial_approval() {
        assert_eq!(
            ExecutionMode::Automatic.initial_approval(),
            ApprovalStatus::NotRequired
        );
        assert_eq!(
            ExecutionMode::SemiAutomatic.initial_approval(),
            ApprovalStatus::Pending
        );
        assert!(!ApprovalStatus::Pending.allows_execution());
        assert!(ApprovalStatus::Approved.allows_execution());
    }
}
