use async_trait::async_trait;
use uuid::Uuid;

use super::{BillingPublicApi, IdentityPublicApi, TrainingPlanPublicApi};
use crate::errors::AppResult;
use crate::services::{BillingService, TrainingPlanService, UserService};

/// Identity answers served from the same process
#[derive(Clone)]
pub struct InProcessIdentityApi {
    users: UserService,
}

impl InProcessIdentityApi {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityPublicApi for InProcessIdentityApi {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        self.users.user_exists(user_id).await
    }
}

#[derive(Clone)]
pub struct InProcessBillingApi {
    billing: BillingService,
}

impl InProcessBillingApi {
    pub fn new(billing: BillingService) -> Self {
        Self { billing }
    }
}

#[async_trait]
impl BillingPublicApi for InProcessBillingApi {
    async fn has_active_subscription(&self, user_id: Uuid) -> AppResult<bool> {
        self.billing.has_active_subscription(user_id).await
    }
}

#[derive(Clone)]
pub struct InProcessTrainingPlanApi {
    training_plans: TrainingPlanService,
}

impl InProcessTrainingPlanApi {
    pub fn new(training_plans: TrainingPlanService) -> Self {
        Self { training_plans }
    }
}

#[async_trait]
impl TrainingPlanPublicApi for InProcessTrainingPlanApi {
    async fn training_plan_exists(&self, training_plan_id: Uuid) -> AppResult<bool> {
        self.training_plans.plan_exists(training_plan_id).await
    }
}
