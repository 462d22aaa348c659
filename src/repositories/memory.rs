use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    BillingRepository, PlanSubscriptionRepository, RepoResult, TrainingPlanRepository, UserRepository,
};
use crate::models::{
    BillingPlan, Day, Exercise, PlanDayProgress, PlanSubscription, Subscription, SubscriptionStatus,
    TrainingPlan, User,
};

type Table<T> = Arc<RwLock<HashMap<Uuid, T>>>;

fn table<T>() -> Table<T> {
    Arc::new(RwLock::new(HashMap::new()))
}

/// In-memory identity store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self { users: table() }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> RepoResult<()> {
        self.users.write().await.insert(user.id, user.clone());
        debug!("Stored user {}", user.id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.deleted_at.is_none() && u.email.to_lowercase() == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id).filter(|u| u.deleted_at.is_none()) {
            Some(user) => {
                user.deleted_at = Some(at);
                user.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// In-memory billing store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryBillingRepository {
    plans: Table<BillingPlan>,
    subscriptions: Table<Subscription>,
}

impl InMemoryBillingRepository {
    pub fn new() -> Self {
        Self {
            plans: table(),
            subscriptions: table(),
        }
    }
}

#[async_trait]
impl BillingRepository for InMemoryBillingRepository {
    async fn insert_plan(&self, plan: &BillingPlan) -> RepoResult<()> {
        self.plans.write().await.insert(plan.id, plan.clone());
        debug!("Stored billing plan {}", plan.id);
        Ok(())
    }

    async fn find_plan(&self, id: Uuid) -> RepoResult<Option<BillingPlan>> {
        let plans = self.plans.read().await;
        Ok(plans.get(&id).filter(|p| p.deleted_at.is_none()).cloned())
    }

    async fn find_plan_by_name(&self, name: &str) -> RepoResult<Option<BillingPlan>> {
        let plans = self.plans.read().await;
        Ok(plans
            .values()
            .find(|p| p.deleted_at.is_none() && p.name == name)
            .cloned())
    }

    async fn list_plans(&self, include_inactive: bool) -> RepoResult<Vec<BillingPlan>> {
        let plans = self.plans.read().await;
        let mut listed: Vec<BillingPlan> = plans
            .values()
            .filter(|p| p.deleted_at.is_none() && (p.active || include_inactive))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.price_cents.cmp(&b.price_cents).then_with(|| a.name.cmp(&b.name)));
        Ok(listed)
    }

    async fn update_plan(&self, plan: &BillingPlan) -> RepoResult<()> {
        self.plans.write().await.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn soft_delete_plan(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut plans = self.plans.write().await;
        match plans.get_mut(&id).filter(|p| p.deleted_at.is_none()) {
            Some(plan) => {
                plan.deleted_at = Some(at);
                plan.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());
        debug!("Stored subscription {}", subscription.id);
        Ok(())
    }

    async fn find_subscription(&self, id: Uuid) -> RepoResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(&id).filter(|s| s.deleted_at.is_none()).cloned())
    }

    async fn list_subscriptions_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        let mut listed: Vec<Subscription> = subscriptions
            .values()
            .filter(|s| s.deleted_at.is_none() && s.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(listed)
    }

    async fn find_active_subscription(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active_at(now))
            .max_by_key(|s| s.expires_at)
            .cloned())
    }

    async fn expire_lapsed_subscriptions(&self, user_id: Uuid, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut subscriptions = self.subscriptions.write().await;
        let mut expired = 0;

        for subscription in subscriptions.values_mut().filter(|s| {
            s.deleted_at.is_none()
                && s.user_id == user_id
                && s.status == SubscriptionStatus::Active
                && s.expires_at <= now
        }) {
            subscription.status = SubscriptionStatus::Expired;
            subscription.updated_at = now;
            expired += 1;
        }

        Ok(expired)
    }

    async fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());
        Ok(())
    }
}

/// In-memory training plan store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryTrainingPlanRepository {
    plans: Table<TrainingPlan>,
    days: Table<Day>,
    exercises: Table<Exercise>,
}

impl InMemoryTrainingPlanRepository {
    pub fn new() -> Self {
        Self {
            plans: table(),
            days: table(),
            exercises: table(),
        }
    }
}

#[async_trait]
impl TrainingPlanRepository for InMemoryTrainingPlanRepository {
    async fn insert_plan(&self, plan: &TrainingPlan, days: &[Day], exercises: &[Exercise]) -> RepoResult<()> {
        // Lock order: plans, days, exercises
        let mut plans = self.plans.write().await;
        let mut stored_days = self.days.write().await;
        let mut stored_exercises = self.exercises.write().await;

        plans.insert(plan.id, plan.clone());
        stored_days.extend(days.iter().map(|d| (d.id, d.clone())));
        stored_exercises.extend(exercises.iter().map(|e| (e.id, e.clone())));

        debug!("Stored training plan {} with {} days", plan.id, days.len());
        Ok(())
    }

    async fn find_plan(&self, id: Uuid) -> RepoResult<Option<TrainingPlan>> {
        let plans = self.plans.read().await;
        Ok(plans.get(&id).filter(|p| p.deleted_at.is_none()).cloned())
    }

    async fn list_plans(&self, limit: i64, offset: i64) -> RepoResult<Vec<TrainingPlan>> {
        let plans = self.plans.read().await;
        let mut listed: Vec<TrainingPlan> = plans
            .values()
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(listed
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_plan(&self, plan: &TrainingPlan) -> RepoResult<()> {
        self.plans.write().await.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn soft_delete_plan(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut plans = self.plans.write().await;
        match plans.get_mut(&id).filter(|p| p.deleted_at.is_none()) {
            Some(plan) => {
                plan.deleted_at = Some(at);
                plan.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn plan_exists(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.find_plan(id).await?.is_some())
    }

    async fn insert_day_with_exercises(&self, day: &Day, exercises: &[Exercise]) -> RepoResult<()> {
        // Lock order: days, exercises
        let mut days = self.days.write().await;
        let mut stored_exercises = self.exercises.write().await;

        days.insert(day.id, day.clone());
        stored_exercises.extend(exercises.iter().map(|e| (e.id, e.clone())));
        Ok(())
    }

    async fn find_day(&self, id: Uuid) -> RepoResult<Option<Day>> {
        let days = self.days.read().await;
        Ok(days.get(&id).filter(|d| d.deleted_at.is_none()).cloned())
    }

    async fn list_days(&self, training_plan_id: Uuid) -> RepoResult<Vec<Day>> {
        let days = self.days.read().await;
        let mut listed: Vec<Day> = days
            .values()
            .filter(|d| d.deleted_at.is_none() && d.training_plan_id == training_plan_id)
            .cloned()
            .collect();
        listed.sort_by_key(|d| d.day_number);
        Ok(listed)
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> RepoResult<()> {
        self.exercises.write().await.insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn list_exercises(&self, day_ids: &[Uuid]) -> RepoResult<Vec<Exercise>> {
        let exercises = self.exercises.read().await;
        let mut listed: Vec<Exercise> = exercises
            .values()
            .filter(|e| e.deleted_at.is_none() && day_ids.contains(&e.day_id))
            .cloned()
            .collect();
        listed.sort_by_key(|e| (e.day_id, e.position));
        Ok(listed)
    }
}

/// In-memory plan subscription store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryPlanSubscriptionRepository {
    subscriptions: Table<PlanSubscription>,
    progress: Table<PlanDayProgress>,
}

impl InMemoryPlanSubscriptionRepository {
    pub fn new() -> Self {
        Self {
            subscriptions: table(),
            progress: table(),
        }
    }
}

#[async_trait]
impl PlanSubscriptionRepository for InMemoryPlanSubscriptionRepository {
    async fn insert(&self, subscription: &PlanSubscription) -> RepoResult<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());
        debug!("Stored plan subscription {}", subscription.id);
        Ok(())
    }

    async fn find_by_pair(&self, training_plan_id: Uuid, user_id: Uuid) -> RepoResult<Option<PlanSubscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .find(|s| {
                s.deleted_at.is_none() && s.training_plan_id == training_plan_id && s.user_id == user_id
            })
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<PlanSubscription>> {
        let subscriptions = self.subscriptions.read().await;
        let mut listed: Vec<PlanSubscription> = subscriptions
            .values()
            .filter(|s| s.deleted_at.is_none() && s.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn update(&self, subscription: &PlanSubscription) -> RepoResult<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn insert_progress(&self, progress: &PlanDayProgress) -> RepoResult<()> {
        self.progress.write().await.insert(progress.id, progress.clone());
        Ok(())
    }

    async fn find_progress(&self, plan_subscription_id: Uuid, day_id: Uuid) -> RepoResult<Option<PlanDayProgress>> {
        let progress = self.progress.read().await;
        Ok(progress
            .values()
            .find(|p| {
                p.deleted_at.is_none() && p.plan_subscription_id == plan_subscription_id && p.day_id == day_id
            })
            .cloned())
    }

    async fn list_progress(&self, plan_subscription_id: Uuid) -> RepoResult<Vec<PlanDayProgress>> {
        let progress = self.progress.read().await;
        let mut listed: Vec<PlanDayProgress> = progress
            .values()
            .filter(|p| p.deleted_at.is_none() && p.plan_subscription_id == plan_subscription_id)
            .cloned()
            .collect();
        listed.sort_by_key(|p| p.completed_at);
        Ok(listed)
    }

    async fn restart(&self, subscription: &PlanSubscription, at: DateTime<Utc>) -> RepoResult<u64> {
        // Lock order: subscriptions, progress
        let mut subscriptions = self.subscriptions.write().await;
        let mut progress = self.progress.write().await;
        let mut cleared = 0;

        subscriptions.insert(subscription.id, subscription.clone());
        for entry in progress
            .values_mut()
            .filter(|p| p.deleted_at.is_none() && p.plan_subscription_id == subscription.id)
        {
            entry.deleted_at = Some(at);
            entry.updated_at = at;
            cleared += 1;
        }

        Ok(cleared)
    }
}
