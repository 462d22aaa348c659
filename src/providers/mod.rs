//! Public API providers.
//!
//! Modules never reach into each other's stores. When one module needs an
//! answer from another ("does this user exist?", "does this user pay?") it
//! goes through one of the traits below. The answer comes either from an
//! in-process adapter over the owning module's service, or from an HTTP
//! client talking to wherever that module is deployed.

pub mod http;
pub mod in_process;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;

pub use http::{HttpBillingApi, HttpIdentityApi, HttpTrainingPlanApi, PublicApiClient};
pub use in_process::{InProcessBillingApi, InProcessIdentityApi, InProcessTrainingPlanApi};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityPublicApi: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingPublicApi: Send + Sync {
    async fn has_active_subscription(&self, user_id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingPlanPublicApi: Send + Sync {
    async fn training_plan_exists(&self, training_plan_id: Uuid) -> AppResult<bool>;
}
