use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthError, UserSession};
use crate::errors::{AppError, AppResult};
use crate::models::{
    PlanDayProgress, PlanSubscription, PlanSubscriptionProgress, PlanSubscriptionStatus,
};
use crate::providers::{BillingPublicApi, IdentityPublicApi, TrainingPlanPublicApi};
use crate::repositories::{PlanSubscriptionRepository, TrainingPlanRepository};

/// Enrollment of users in training plans and their progress through them.
///
/// User and plan existence, and the billing precondition, are answered by
/// the other modules' public APIs; only days are read from the plan store.
#[derive(Clone)]
pub struct PlanSubscriptionService {
    subscriptions: Arc<dyn PlanSubscriptionRepository>,
    training_plans: Arc<dyn TrainingPlanRepository>,
    identity: Arc<dyn IdentityPublicApi>,
    training_plan_api: Arc<dyn TrainingPlanPublicApi>,
    billing: Arc<dyn BillingPublicApi>,
    require_active_billing: bool,
}

impl PlanSubscriptionService {
    pub fn new(
        subscriptions: Arc<dyn PlanSubscriptionRepository>,
        training_plans: Arc<dyn TrainingPlanRepository>,
        identity: Arc<dyn IdentityPublicApi>,
        training_plan_api: Arc<dyn TrainingPlanPublicApi>,
        billing: Arc<dyn BillingPublicApi>,
    ) -> Self {
        Self {
            subscriptions,
            training_plans,
            identity,
            training_plan_api,
            billing,
            require_active_billing: true,
        }
    }

    pub fn with_required_billing(mut self, require_active_billing: bool) -> Self {
        self.require_active_billing = require_active_billing;
        self
    }

    pub async fn subscribe(
        &self,
        training_plan_id: Uuid,
        user_id: Uuid,
        caller: &UserSession,
    ) -> AppResult<PlanSubscription> {
        ensure_caller(caller, user_id)?;

        if !self.identity.user_exists(user_id).await? {
            return Err(AppError::not_found("User"));
        }

        if !self.training_plan_api.training_plan_exists(training_plan_id).await? {
            return Err(AppError::not_found("Training plan"));
        }

        if self.require_active_billing && !self.billing.has_active_subscription(user_id).await? {
            warn!("User {} tried to enroll without an active billing subscription", user_id);
            return Err(AppError::bad_request("User has no active billing subscription"));
        }

        if self
            .subscriptions
            .find_by_pair(training_plan_id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User is already subscribed to this training plan"));
        }

        let subscription = PlanSubscription::new(training_plan_id, user_id);
        self.subscriptions.insert(&subscription).await?;
        info!(
            "User {} subscribed to training plan {}",
            user_id, training_plan_id
        );

        Ok(subscription)
    }

    pub async fn get_progress(
        &self,
        training_plan_id: Uuid,
        user_id: Uuid,
        caller: &UserSession,
    ) -> AppResult<PlanSubscriptionProgress> {
        ensure_caller(caller, user_id)?;
        let subscription = self.find_subscription(training_plan_id, user_id).await?;
        self.summarize(subscription).await
    }

    pub async fn list_for_user(&self, user_id: Uuid, caller: &UserSession) -> AppResult<Vec<PlanSubscription>> {
        ensure_caller(caller, user_id)?;
        Ok(self.subscriptions.list_by_user(user_id).await?)
    }

    /// Drive the subscription through its status state machine.
    ///
    /// Restarting a canceled subscription wipes its recorded day progress in
    /// the same write that stores the new status.
    pub async fn change_status(
        &self,
        training_plan_id: Uuid,
        user_id: Uuid,
        next: PlanSubscriptionStatus,
        caller: &UserSession,
    ) -> AppResult<PlanSubscription> {
        ensure_caller(caller, user_id)?;
        self.ensure_plan_live(training_plan_id).await?;
        let mut subscription = self.find_subscription(training_plan_id, user_id).await?;
        let (id, previous) = (subscription.id, subscription.status);
        let now = Utc::now();

        let restarted = subscription.apply_transition(next, now).map_err(|err| {
            warn!("Rejected plan subscription transition for {}: {}", id, err);
            AppError::from(err)
        })?;

        if restarted {
            let cleared = self.subscriptions.restart(&subscription, now).await?;
            info!("Cleared {} progress entries of plan subscription {}", cleared, subscription.id);
        } else {
            self.subscriptions.update(&subscription).await?;
        }

        info!("Plan subscription {} moved from {} to {}", subscription.id, previous, next);
        Ok(subscription)
    }

    pub async fn complete_day(
        &self,
        training_plan_id: Uuid,
        user_id: Uuid,
        day_id: Uuid,
        caller: &UserSession,
    ) -> AppResult<PlanSubscriptionProgress> {
        ensure_caller(caller, user_id)?;
        self.ensure_plan_live(training_plan_id).await?;
        let subscription = self.find_subscription(training_plan_id, user_id).await?;

        if subscription.status != PlanSubscriptionStatus::InProgress {
            return Err(AppError::bad_request(format!(
                "Days can only be completed while the plan subscription is inProgress (currently {})",
                subscription.status
            )));
        }

        let day = self
            .training_plans
            .find_day(day_id)
            .await?
            .filter(|day| day.training_plan_id == training_plan_id)
            .ok_or_else(|| AppError::not_found("Day"))?;

        if self
            .subscriptions
            .find_progress(subscription.id, day.id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Day already completed"));
        }

        self.subscriptions
            .insert_progress(&PlanDayProgress::new(subscription.id, day.id))
            .await?;
        info!("Plan subscription {} completed day {}", subscription.id, day.day_number);

        self.summarize(subscription).await
    }

    /// Enrollments in a deleted plan are frozen
    async fn ensure_plan_live(&self, training_plan_id: Uuid) -> AppResult<()> {
        if !self.training_plan_api.training_plan_exists(training_plan_id).await? {
            return Err(AppError::not_found("Training plan"));
        }
        Ok(())
    }

    async fn find_subscription(&self, training_plan_id: Uuid, user_id: Uuid) -> AppResult<PlanSubscription> {
        self.subscriptions
            .find_by_pair(training_plan_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan subscription"))
    }

    async fn summarize(&self, subscription: PlanSubscription) -> AppResult<PlanSubscriptionProgress> {
        let progress = self.subscriptions.list_progress(subscription.id).await?;
        let total_days = self
            .training_plans
            .list_days(subscription.training_plan_id)
            .await?
            .len();

        Ok(PlanSubscriptionProgress::new(subscription, progress, total_days))
    }
}

fn ensure_caller(caller: &UserSession, user_id: Uuid) -> AppResult<()> {
    if !caller.can_act_for(user_id) {
        return Err(AuthError::InsufficientPermissions.into());
    }
    Ok(())
}
