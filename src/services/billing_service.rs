use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthError, UserSession};
use crate::errors::{AppError, AppResult};
use crate::models::{
    validate_currency, validate_name, validate_non_negative, BillingPlan, CreateBillingPlanRequest,
    CreateSubscriptionRequest, Subscription, SubscriptionStatus, UpdateBillingPlanRequest,
};
use crate::providers::IdentityPublicApi;
use crate::repositories::BillingRepository;

fn validation(err: anyhow::Error) -> AppError {
    AppError::Validation(err.to_string())
}

/// Billing module use cases: plans and user subscriptions
#[derive(Clone)]
pub struct BillingService {
    repo: Arc<dyn BillingRepository>,
    identity: Arc<dyn IdentityPublicApi>,
}

impl BillingService {
    pub fn new(repo: Arc<dyn BillingRepository>, identity: Arc<dyn IdentityPublicApi>) -> Self {
        Self { repo, identity }
    }

    // Plan CRUD operations
    pub async fn create_plan(&self, request: CreateBillingPlanRequest) -> AppResult<BillingPlan> {
        validate_name("Plan name", &request.name).map_err(validation)?;
        validate_non_negative("Price", request.price_cents).map_err(validation)?;
        validate_currency(&request.currency).map_err(validation)?;

        let name = request.name.trim().to_string();
        if self.repo.find_plan_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("Billing plan name already exists"));
        }

        let now = Utc::now();
        let plan = BillingPlan {
            id: Uuid::new_v4(),
            name,
            description: request.description,
            price_cents: request.price_cents,
            currency: request.currency,
            interval: request.interval,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.repo.insert_plan(&plan).await?;
        info!("Created billing plan {} ({})", plan.id, plan.name);

        Ok(plan)
    }

    pub async fn list_plans(&self, include_inactive: bool) -> AppResult<Vec<BillingPlan>> {
        Ok(self.repo.list_plans(include_inactive).await?)
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<BillingPlan> {
        self.repo
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Billing plan"))
    }

    pub async fn update_plan(&self, plan_id: Uuid, request: UpdateBillingPlanRequest) -> AppResult<BillingPlan> {
        let mut plan = self.get_plan(plan_id).await?;

        if let Some(name) = request.name {
            validate_name("Plan name", &name).map_err(validation)?;
            let name = name.trim().to_string();
            if let Some(other) = self.repo.find_plan_by_name(&name).await? {
                if other.id != plan.id {
                    return Err(AppError::conflict("Billing plan name already exists"));
                }
            }
            plan.name = name;
        }
        if let Some(description) = request.description {
            plan.description = description;
        }
        if let Some(price_cents) = request.price_cents {
            validate_non_negative("Price", price_cents).map_err(validation)?;
            plan.price_cents = price_cents;
        }
        if let Some(active) = request.active {
            plan.active = active;
        }

        plan.updated_at = Utc::now();
        self.repo.update_plan(&plan).await?;
        info!("Updated billing plan {}", plan.id);

        Ok(plan)
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> AppResult<()> {
        if !self.repo.soft_delete_plan(plan_id, Utc::now()).await? {
            return Err(AppError::not_found("Billing plan"));
        }

        info!("Deleted billing plan {}", plan_id);
        Ok(())
    }

    // Subscriptions
    pub async fn subscribe(&self, request: CreateSubscriptionRequest) -> AppResult<Subscription> {
        if !self.identity.user_exists(request.user_id).await? {
            return Err(AppError::not_found("User"));
        }

        let plan = self.get_plan(request.plan_id).await?;
        if !plan.active {
            return Err(AppError::bad_request("Billing plan is not available for new subscriptions"));
        }

        // Lapsed rows still say `active` until settled, and storage allows one per user
        let now = Utc::now();
        let expired = self.repo.expire_lapsed_subscriptions(request.user_id, now).await?;
        if expired > 0 {
            info!("Expired {} lapsed subscriptions of user {}", expired, request.user_id);
        }

        if self.repo.find_active_subscription(request.user_id, now).await?.is_some() {
            warn!("User {} already holds an active subscription", request.user_id);
            return Err(AppError::conflict("User already has an active subscription"));
        }

        let expires_at = plan
            .interval
            .period_end(now)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Billing period end out of range")))?;

        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            plan_id: plan.id,
            status: SubscriptionStatus::Active,
            started_at: now,
            expires_at,
            canceled_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.repo.insert_subscription(&subscription).await?;
        info!(
            "User {} subscribed to billing plan {} until {}",
            subscription.user_id, plan.id, subscription.expires_at
        );

        Ok(subscription)
    }

    pub async fn cancel_subscription(&self, subscription_id: Uuid, caller: &UserSession) -> AppResult<Subscription> {
        let mut subscription = self
            .repo
            .find_subscription(subscription_id)
            .await?
            .ok_or_else(|| AppError::not_found("Subscription"))?;

        if !caller.can_act_for(subscription.user_id) {
            return Err(AuthError::InsufficientPermissions.into());
        }

        let now = Utc::now();
        if !subscription.is_active_at(now) {
            return Err(AppError::bad_request("Only active subscriptions can be canceled"));
        }

        subscription.status = SubscriptionStatus::Canceled;
        subscription.canceled_at = Some(now);
        subscription.updated_at = now;
        self.repo.update_subscription(&subscription).await?;
        info!("Canceled subscription {}", subscription.id);

        Ok(subscription)
    }

    /// Lists a user's subscriptions, settling lapsed ones to `expired` on the way
    pub async fn list_user_subscriptions(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let expired = self.repo.expire_lapsed_subscriptions(user_id, Utc::now()).await?;
        if expired > 0 {
            info!("Expired {} lapsed subscriptions of user {}", expired, user_id);
        }

        Ok(self.repo.list_subscriptions_by_user(user_id).await?)
    }

    pub async fn has_active_subscription(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .repo
            .find_active_subscription(user_id, Utc::now())
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use crate::models::BillingInterval;
    use crate::providers::MockIdentityPublicApi;
    use crate::repositories::InMemoryBillingRepository;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn identity(exists: bool) -> Arc<dyn IdentityPublicApi> {
        let mut identity = MockIdentityPublicApi::new();
        identity.expect_user_exists().returning(move |_| Ok(exists));
        Arc::new(identity)
    }

    fn plan_request(name: &str) -> CreateBillingPlanRequest {
        CreateBillingPlanRequest {
            name: name.to_string(),
            description: "All training plans".to_string(),
            price_cents: 1999,
            currency: "USD".to_string(),
            interval: BillingInterval::Monthly,
        }
    }

    fn session(user_id: Uuid) -> UserSession {
        UserSession {
            user_id,
            email: "athlete@example.com".to_string(),
            role: UserRole::Athlete,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[tokio::test]
    async fn test_plan_name_is_unique() {
        let service = BillingService::new(Arc::new(InMemoryBillingRepository::new()), identity(true));
        service.create_plan(plan_request("Pro")).await.unwrap();

        assert_matches!(service.create_plan(plan_request("Pro")).await, Err(AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_plan_validation() {
        let service = BillingService::new(Arc::new(InMemoryBillingRepository::new()), identity(true));

        let mut negative = plan_request("Negative");
        negative.price_cents = -1;
        assert_matches!(service.create_plan(negative).await, Err(AppError::Validation(_)));

        let mut currency = plan_request("Currency");
        currency.currency = "dollars".to_string();
        assert_matches!(service.create_plan(currency).await, Err(AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_subscribe_requires_existing_user() {
        let service = BillingService::new(Arc::new(InMemoryBillingRepository::new()), identity(false));
        let plan = service.create_plan(plan_request("Pro")).await.unwrap();

        let result = service
            .subscribe(CreateSubscriptionRequest {
                user_id: Uuid::new_v4(),
                plan_id: plan.id,
            })
            .await;
        assert_matches!(result, Err(AppError::NotFound(entity)) if entity == "User");
    }

    #[tokio::test]
    async fn test_one_active_subscription_per_user() {
        let service = BillingService::new(Arc::new(InMemoryBillingRepository::new()), identity(true));
        let plan = service.create_plan(plan_request("Pro")).await.unwrap();
        let user_id = Uuid::new_v4();
        let request = CreateSubscriptionRequest { user_id, plan_id: plan.id };

        let subscription = service.subscribe(request.clone()).await.unwrap();
        assert!(subscription.expires_at > subscription.started_at + Duration::days(27));
        assert!(service.has_active_subscription(user_id).await.unwrap());

        assert_matches!(service.subscribe(request.clone()).await, Err(AppError::Conflict(_)));

        service.cancel_subscription(subscription.id, &session(user_id)).await.unwrap();
        assert!(!service.has_active_subscription(user_id).await.unwrap());

        // A canceled subscription frees the slot
        assert!(service.subscribe(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_plan_rejects_subscriptions() {
        let service = BillingService::new(Arc::new(InMemoryBillingRepository::new()), identity(true));
        let plan = service.create_plan(plan_request("Legacy")).await.unwrap();
        service
            .update_plan(
                plan.id,
                UpdateBillingPlanRequest {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = service
            .subscribe(CreateSubscriptionRequest {
                user_id: Uuid::new_v4(),
                plan_id: plan.id,
            })
            .await;
        assert_matches!(result, Err(AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let service = BillingService::new(Arc::new(InMemoryBillingRepository::new()), identity(true));
        let plan = service.create_plan(plan_request("Pro")).await.unwrap();
        let user_id = Uuid::new_v4();
        let subscription = service
            .subscribe(CreateSubscriptionRequest { user_id, plan_id: plan.id })
            .await
            .unwrap();

        assert_matches!(
            service.cancel_subscription(subscription.id, &session(Uuid::new_v4())).await,
            Err(AppError::Auth(AuthError::InsufficientPermissions))
        );

        service.cancel_subscription(subscription.id, &session(user_id)).await.unwrap();
        assert_matches!(
            service.cancel_subscription(subscription.id, &session(user_id)).await,
            Err(AppError::BadRequest(_))
        );
    }

    #[tokio::test]
    async fn test_lapsed_subscriptions_are_listed_as_expired() {
        let repo = Arc::new(InMemoryBillingRepository::new());
        let service = BillingService::new(repo.clone(), identity(true));
        let user_id = Uuid::new_v4();
        let past = Utc::now() - Duration::days(40);

        repo.insert_subscription(&Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: Uuid::new_v4(),
            status: SubscriptionStatus::Active,
            started_at: past,
            expires_at: past + Duration::days(30),
            canceled_at: None,
            created_at: past,
            updated_at: past,
            deleted_at: None,
        })
        .await
        .unwrap();

        assert!(!service.has_active_subscription(user_id).await.unwrap());
        let listed = service.list_user_subscriptions(user_id).await.unwrap();
        assert_eq!(listed[0].status, SubscriptionStatus::Expired);
    }

    #[tokio::test]
    async fn test_subscribe_settles_lapsed_subscription_first() {
        let repo = Arc::new(InMemoryBillingRepository::new());
        let service = BillingService::new(repo.clone(), identity(true));
        let plan = service.create_plan(plan_request("Pro")).await.unwrap();
        let user_id = Uuid::new_v4();
        let past = Utc::now() - Duration::days(40);

        let lapsed = Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            status: SubscriptionStatus::Active,
            started_at: past,
            expires_at: past + Duration::days(30),
            canceled_at: None,
            created_at: past,
            updated_at: past,
            deleted_at: None,
        };
        repo.insert_subscription(&lapsed).await.unwrap();

        let renewed = service
            .subscribe(CreateSubscriptionRequest { user_id, plan_id: plan.id })
            .await
            .unwrap();

        let statuses: Vec<(Uuid, SubscriptionStatus)> = repo
            .list_subscriptions_by_user(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.id, s.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (renewed.id, SubscriptionStatus::Active),
                (lapsed.id, SubscriptionStatus::Expired),
            ]
        );
    }
}
