// Persistence seams: one trait per module, backed by Postgres in production
// and by in-memory maps for tests and local runs.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    BillingPlan, Day, Exercise, PlanDayProgress, PlanSubscription, Subscription, TrainingPlan, User,
};

pub use memory::{
    InMemoryBillingRepository, InMemoryPlanSubscriptionRepository, InMemoryTrainingPlanRepository,
    InMemoryUserRepository,
};
pub use postgres::{
    PgBillingRepository, PgPlanSubscriptionRepository, PgTrainingPlanRepository, PgUserRepository,
};

pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Every read ignores soft-deleted rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> RepoResult<()>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;
    /// `email` must already be normalized
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn update(&self, user: &User) -> RepoResult<()>;
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool>;
    async fn exists(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn insert_plan(&self, plan: &BillingPlan) -> RepoResult<()>;
    async fn find_plan(&self, id: Uuid) -> RepoResult<Option<BillingPlan>>;
    async fn find_plan_by_name(&self, name: &str) -> RepoResult<Option<BillingPlan>>;
    async fn list_plans(&self, include_inactive: bool) -> RepoResult<Vec<BillingPlan>>;
    async fn update_plan(&self, plan: &BillingPlan) -> RepoResult<()>;
    async fn soft_delete_plan(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool>;

    async fn insert_subscription(&self, subscription: &Subscription) -> RepoResult<()>;
    async fn find_subscription(&self, id: Uuid) -> RepoResult<Option<Subscription>>;
    async fn list_subscriptions_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Subscription>>;
    /// Status `active` and not yet expired at `now`
    async fn find_active_subscription(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Subscription>>;
    /// Settles the user's `active` rows whose period ended before `now`
    async fn expire_lapsed_subscriptions(&self, user_id: Uuid, now: DateTime<Utc>) -> RepoResult<u64>;
    async fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()>;
}

#[async_trait]
pub trait TrainingPlanRepository: Send + Sync {
    /// Stores a plan and its initial content atomically
    async fn insert_plan(&self, plan: &TrainingPlan, days: &[Day], exercises: &[Exercise]) -> RepoResult<()>;
    async fn find_plan(&self, id: Uuid) -> RepoResult<Option<TrainingPlan>>;
    async fn list_plans(&self, limit: i64, offset: i64) -> RepoResult<Vec<TrainingPlan>>;
    async fn update_plan(&self, plan: &TrainingPlan) -> RepoResult<()>;
    async fn soft_delete_plan(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool>;
    async fn plan_exists(&self, id: Uuid) -> RepoResult<bool>;

    /// Stores a day together with its exercises atomically
    async fn insert_day_with_exercises(&self, day: &Day, exercises: &[Exercise]) -> RepoResult<()>;
    async fn find_day(&self, id: Uuid) -> RepoResult<Option<Day>>;
    /// Ordered by `day_number`
    async fn list_days(&self, training_plan_id: Uuid) -> RepoResult<Vec<Day>>;

    async fn insert_exercise(&self, exercise: &Exercise) -> RepoResult<()>;
    /// Ordered by day, then `position`
    async fn list_exercises(&self, day_ids: &[Uuid]) -> RepoResult<Vec<Exercise>>;
}

#[async_trait]
pub trait PlanSubscriptionRepository: Send + Sync {
    async fn insert(&self, subscription: &PlanSubscription) -> RepoResult<()>;
    async fn find_by_pair(&self, training_plan_id: Uuid, user_id: Uuid) -> RepoResult<Option<PlanSubscription>>;
    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<PlanSubscription>>;
    async fn update(&self, subscription: &PlanSubscription) -> RepoResult<()>;

    async fn insert_progress(&self, progress: &PlanDayProgress) -> RepoResult<()>;
    async fn find_progress(&self, plan_subscription_id: Uuid, day_id: Uuid) -> RepoResult<Option<PlanDayProgress>>;
    async fn list_progress(&self, plan_subscription_id: Uuid) -> RepoResult<Vec<PlanDayProgress>>;
    /// Persists a restarted subscription and soft-deletes its day progress
    /// in one atomic step. Returns the number of progress entries cleared.
    async fn restart(&self, subscription: &PlanSubscription, at: DateTime<Utc>) -> RepoResult<u64>;
}

/// The full set of stores the application is wired with
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub billing: Arc<dyn BillingRepository>,
    pub training_plans: Arc<dyn TrainingPlanRepository>,
    pub plan_subscriptions: Arc<dyn PlanSubscriptionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            billing: Arc::new(PgBillingRepository::new(pool.clone())),
            training_plans: Arc::new(PgTrainingPlanRepository::new(pool.clone())),
            plan_subscriptions: Arc::new(PgPlanSubscriptionRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            billing: Arc::new(InMemoryBillingRepository::new()),
            training_plans: Arc::new(InMemoryTrainingPlanRepository::new()),
            plan_subscriptions: Arc::new(InMemoryPlanSubscriptionRepository::new()),
        }
    }
}
