use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle of a user's enrollment in a training plan.
///
/// ```text
/// notStarted ──► inProgress ──► completed
///     ▲              │
///     └── canceled ◄─┘
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Type)]
#[serde(rename_all = "camelCase")]
#[sqlx(type_name = "plan_subscription_status", rename_all = "snake_case")]
pub enum PlanSubscriptionStatus {
    NotStarted,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot move plan subscription from {from} to {to}")]
pub struct InvalidTransition {
    pub from: PlanSubscriptionStatus,
    pub to: PlanSubscriptionStatus,
}

impl PlanSubscriptionStatus {
    pub const ALL: [PlanSubscriptionStatus; 4] = [
        PlanSubscriptionStatus::NotStarted,
        PlanSubscriptionStatus::InProgress,
        PlanSubscriptionStatus::Completed,
        PlanSubscriptionStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanSubscriptionStatus::NotStarted => "notStarted",
            PlanSubscriptionStatus::InProgress => "inProgress",
            PlanSubscriptionStatus::Completed => "completed",
            PlanSubscriptionStatus::Canceled => "canceled",
        }
    }

    pub fn can_transition_to(&self, next: PlanSubscriptionStatus) -> bool {
        use PlanSubscriptionStatus::*;

        matches!(
            (self, next),
            (NotStarted, InProgress) | (InProgress, Completed) | (InProgress, Canceled) | (Canceled, NotStarted)
        )
    }

    pub fn transition_to(&self, next: PlanSubscriptionStatus) -> Result<PlanSubscriptionStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { from: *self, to: next })
        }
    }
}

impl std::fmt::Display for PlanSubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanSubscription {
    pub id: Uuid,
    pub training_plan_id: Uuid,
    pub user_id: Uuid,
    pub status: PlanSubscriptionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PlanSubscription {
    pub fn new(training_plan_id: Uuid, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            training_plan_id,
            user_id,
            status: PlanSubscriptionStatus::NotStarted,
            started_at: None,
            completed_at: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Move to `next`, stamping the matching timestamp.
    ///
    /// Returns `true` when the transition is a restart, which means the
    /// caller must also discard the recorded day progress.
    pub fn apply_transition(
        &mut self,
        next: PlanSubscriptionStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, InvalidTransition> {
        self.status = self.status.transition_to(next)?;
        self.updated_at = at;

        match next {
            PlanSubscriptionStatus::InProgress => self.started_at = Some(at),
            PlanSubscriptionStatus::Completed => self.completed_at = Some(at),
            PlanSubscriptionStatus::Canceled => self.canceled_at = Some(at),
            PlanSubscriptionStatus::NotStarted => {
                self.started_at = None;
                self.completed_at = None;
                self.canceled_at = None;
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanDayProgress {
    pub id: Uuid,
    pub plan_subscription_id: Uuid,
    pub day_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PlanDayProgress {
    pub fn new(plan_subscription_id: Uuid, day_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plan_subscription_id,
            day_id,
            completed_at: now,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Subscription plus how far through the plan the user is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSubscriptionProgress {
    pub subscription: PlanSubscription,
    pub completed_day_ids: Vec<Uuid>,
    pub completed_days: usize,
    pub total_days: usize,
    pub progress_percentage: f64,
}

impl PlanSubscriptionProgress {
    pub fn new(subscription: PlanSubscription, progress: Vec<PlanDayProgress>, total_days: usize) -> Self {
        let completed_day_ids: Vec<Uuid> = progress.into_iter().map(|entry| entry.day_id).collect();
        let completed_days = completed_day_ids.len();
        let progress_percentage = if total_days == 0 {
            0.0
        } else {
            ((completed_days as f64 / total_days as f64) * 100.0).min(100.0)
        };

        Self {
            subscription,
            completed_day_ids,
            completed_days,
            total_days,
            progress_percentage,
        }
    }
}
