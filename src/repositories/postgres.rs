use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    BillingRepository, PlanSubscriptionRepository, RepoResult, TrainingPlanRepository, UserRepository,
};
use crate::models::{
    BillingPlan, Day, Exercise, PlanDayProgress, PlanSubscription, Subscription, TrainingPlan, User,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at, deleted_at";
const BILLING_PLAN_COLUMNS: &str =
    "id, name, description, price_cents, currency, interval, active, created_at, updated_at, deleted_at";
const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, plan_id, status, started_at, expires_at, canceled_at, created_at, updated_at, deleted_at";
const TRAINING_PLAN_COLUMNS: &str =
    "id, name, description, author_id, difficulty, created_at, updated_at, deleted_at";
const DAY_COLUMNS: &str =
    "id, training_plan_id, day_number, title, description, created_at, updated_at, deleted_at";
const EXERCISE_COLUMNS: &str =
    "id, day_id, name, sets, repetitions, rest_seconds, notes, position, created_at, updated_at, deleted_at";
const PLAN_SUBSCRIPTION_COLUMNS: &str = "id, training_plan_id, user_id, status, started_at, completed_at, \
     canceled_at, created_at, updated_at, deleted_at";
const PROGRESS_COLUMNS: &str =
    "id, plan_subscription_id, day_id, completed_at, created_at, updated_at, deleted_at";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        sqlx::query("UPDATE users SET name = $2, email = $3, role = $4, updated_at = $5 WHERE id = $1")
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role)
            .bind(user.updated_at)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
    }
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgBillingRepository {
    db: PgPool,
}

impl PgBillingRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BillingRepository for PgBillingRepository {
    async fn insert_plan(&self, plan: &BillingPlan) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO billing_plans (id, name, description, price_cents, currency, interval, active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price_cents)
        .bind(&plan.currency)
        .bind(plan.interval)
        .bind(plan.active)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_plan(&self, id: Uuid) -> RepoResult<Option<BillingPlan>> {
        sqlx::query_as::<_, BillingPlan>(&format!(
            "SELECT {BILLING_PLAN_COLUMNS} FROM billing_plans WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_plan_by_name(&self, name: &str) -> RepoResult<Option<BillingPlan>> {
        sqlx::query_as::<_, BillingPlan>(&format!(
            "SELECT {BILLING_PLAN_COLUMNS} FROM billing_plans WHERE name = $1 AND deleted_at IS NULL"
        ))
        .bind(name)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_plans(&self, include_inactive: bool) -> RepoResult<Vec<BillingPlan>> {
        sqlx::query_as::<_, BillingPlan>(&format!(
            "SELECT {BILLING_PLAN_COLUMNS} FROM billing_plans
             WHERE deleted_at IS NULL AND (active OR $1)
             ORDER BY price_cents ASC, name ASC"
        ))
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await
    }

    async fn update_plan(&self, plan: &BillingPlan) -> RepoResult<()> {
        sqlx::query(
            "UPDATE billing_plans
             SET name = $2, description = $3, price_cents = $4, active = $5, updated_at = $6
             WHERE id = $1",
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price_cents)
        .bind(plan.active)
        .bind(plan.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn soft_delete_plan(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE billing_plans SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO subscriptions (id, user_id, plan_id, status, started_at, expires_at, canceled_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.plan_id)
        .bind(subscription.status)
        .bind(subscription.started_at)
        .bind(subscription.expires_at)
        .bind(subscription.canceled_at)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_subscription(&self, id: Uuid) -> RepoResult<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_subscriptions_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY started_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    async fn find_active_subscription(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
             WHERE user_id = $1 AND status = 'active' AND expires_at > $2 AND deleted_at IS NULL
             ORDER BY expires_at DESC
             LIMIT 1"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.db)
        .await
    }

    async fn expire_lapsed_subscriptions(&self, user_id: Uuid, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status = 'expired', updated_at = $2
             WHERE user_id = $1 AND status = 'active' AND expires_at <= $2 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> RepoResult<()> {
        sqlx::query(
            "UPDATE subscriptions SET status = $2, canceled_at = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(subscription.id)
        .bind(subscription.status)
        .bind(subscription.canceled_at)
        .bind(subscription.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Training plans
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgTrainingPlanRepository {
    db: PgPool,
}

impl PgTrainingPlanRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn insert_day_with<'e, E>(executor: E, day: &Day) -> RepoResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO training_plan_days (id, training_plan_id, day_number, title, description, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(day.id)
    .bind(day.training_plan_id)
    .bind(day.day_number)
    .bind(&day.title)
    .bind(&day.description)
    .bind(day.created_at)
    .bind(day.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn insert_exercise_with<'e, E>(executor: E, exercise: &Exercise) -> RepoResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO exercises (id, day_id, name, sets, repetitions, rest_seconds, notes, position, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(exercise.id)
    .bind(exercise.day_id)
    .bind(&exercise.name)
    .bind(exercise.sets)
    .bind(exercise.repetitions)
    .bind(exercise.rest_seconds)
    .bind(&exercise.notes)
    .bind(exercise.position)
    .bind(exercise.created_at)
    .bind(exercise.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl TrainingPlanRepository for PgTrainingPlanRepository {
    async fn insert_plan(&self, plan: &TrainingPlan, days: &[Day], exercises: &[Exercise]) -> RepoResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO training_plans (id, name, description, author_id, difficulty, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.author_id)
        .bind(plan.difficulty)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&mut *tx)
        .await?;

        for day in days {
            insert_day_with(&mut *tx, day).await?;
        }

        for exercise in exercises {
            insert_exercise_with(&mut *tx, exercise).await?;
        }

        tx.commit().await
    }

    async fn find_plan(&self, id: Uuid) -> RepoResult<Option<TrainingPlan>> {
        sqlx::query_as::<_, TrainingPlan>(&format!(
            "SELECT {TRAINING_PLAN_COLUMNS} FROM training_plans WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_plans(&self, limit: i64, offset: i64) -> RepoResult<Vec<TrainingPlan>> {
        sqlx::query_as::<_, TrainingPlan>(&format!(
            "SELECT {TRAINING_PLAN_COLUMNS} FROM training_plans
             WHERE deleted_at IS NULL
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
    }

    async fn update_plan(&self, plan: &TrainingPlan) -> RepoResult<()> {
        sqlx::query(
            "UPDATE training_plans SET name = $2, description = $3, difficulty = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.difficulty)
        .bind(plan.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn soft_delete_plan(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE training_plans SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn plan_exists(&self, id: Uuid) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM training_plans WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
    }

    async fn insert_day_with_exercises(&self, day: &Day, exercises: &[Exercise]) -> RepoResult<()> {
        let mut tx = self.db.begin().await?;

        insert_day_with(&mut *tx, day).await?;
        for exercise in exercises {
            insert_exercise_with(&mut *tx, exercise).await?;
        }

        tx.commit().await
    }

    async fn find_day(&self, id: Uuid) -> RepoResult<Option<Day>> {
        sqlx::query_as::<_, Day>(&format!(
            "SELECT {DAY_COLUMNS} FROM training_plan_days WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_days(&self, training_plan_id: Uuid) -> RepoResult<Vec<Day>> {
        sqlx::query_as::<_, Day>(&format!(
            "SELECT {DAY_COLUMNS} FROM training_plan_days
             WHERE training_plan_id = $1 AND deleted_at IS NULL
             ORDER BY day_number ASC"
        ))
        .bind(training_plan_id)
        .fetch_all(&self.db)
        .await
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> RepoResult<()> {
        insert_exercise_with(&self.db, exercise).await
    }

    async fn list_exercises(&self, day_ids: &[Uuid]) -> RepoResult<Vec<Exercise>> {
        if day_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Exercise>(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises
             WHERE day_id = ANY($1) AND deleted_at IS NULL
             ORDER BY day_id, position ASC"
        ))
        .bind(day_ids)
        .fetch_all(&self.db)
        .await
    }
}

// ---------------------------------------------------------------------------
// Plan subscriptions
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgPlanSubscriptionRepository {
    db: PgPool,
}

impl PgPlanSubscriptionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn update_plan_subscription_with<'e, E>(executor: E, subscription: &PlanSubscription) -> RepoResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE plan_subscriptions
         SET status = $2, started_at = $3, completed_at = $4, canceled_at = $5, updated_at = $6
         WHERE id = $1",
    )
    .bind(subscription.id)
    .bind(subscription.status)
    .bind(subscription.started_at)
    .bind(subscription.completed_at)
    .bind(subscription.canceled_at)
    .bind(subscription.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl PlanSubscriptionRepository for PgPlanSubscriptionRepository {
    async fn insert(&self, subscription: &PlanSubscription) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO plan_subscriptions (id, training_plan_id, user_id, status, started_at, completed_at, canceled_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(subscription.id)
        .bind(subscription.training_plan_id)
        .bind(subscription.user_id)
        .bind(subscription.status)
        .bind(subscription.started_at)
        .bind(subscription.completed_at)
        .bind(subscription.canceled_at)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_by_pair(&self, training_plan_id: Uuid, user_id: Uuid) -> RepoResult<Option<PlanSubscription>> {
        sqlx::query_as::<_, PlanSubscription>(&format!(
            "SELECT {PLAN_SUBSCRIPTION_COLUMNS} FROM plan_subscriptions
             WHERE training_plan_id = $1 AND user_id = $2 AND deleted_at IS NULL"
        ))
        .bind(training_plan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<PlanSubscription>> {
        sqlx::query_as::<_, PlanSubscription>(&format!(
            "SELECT {PLAN_SUBSCRIPTION_COLUMNS} FROM plan_subscriptions
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    async fn update(&self, subscription: &PlanSubscription) -> RepoResult<()> {
        update_plan_subscription_with(&self.db, subscription).await
    }

    async fn insert_progress(&self, progress: &PlanDayProgress) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO plan_day_progress (id, plan_subscription_id, day_id, completed_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(progress.id)
        .bind(progress.plan_subscription_id)
        .bind(progress.day_id)
        .bind(progress.completed_at)
        .bind(progress.created_at)
        .bind(progress.updated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_progress(&self, plan_subscription_id: Uuid, day_id: Uuid) -> RepoResult<Option<PlanDayProgress>> {
        sqlx::query_as::<_, PlanDayProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM plan_day_progress
             WHERE plan_subscription_id = $1 AND day_id = $2 AND deleted_at IS NULL"
        ))
        .bind(plan_subscription_id)
        .bind(day_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_progress(&self, plan_subscription_id: Uuid) -> RepoResult<Vec<PlanDayProgress>> {
        sqlx::query_as::<_, PlanDayProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM plan_day_progress
             WHERE plan_subscription_id = $1 AND deleted_at IS NULL
             ORDER BY completed_at ASC"
        ))
        .bind(plan_subscription_id)
        .fetch_all(&self.db)
        .await
    }

    async fn restart(&self, subscription: &PlanSubscription, at: DateTime<Utc>) -> RepoResult<u64> {
        let mut tx = self.db.begin().await?;

        update_plan_subscription_with(&mut *tx, subscription).await?;
        let result = sqlx::query(
            "UPDATE plan_day_progress SET deleted_at = $2, updated_at = $2
             WHERE plan_subscription_id = $1 AND deleted_at IS NULL",
        )
        .bind(subscription.id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
