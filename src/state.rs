use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRef;
use tracing::info;

use crate::auth::{AuthService, JwtService};
use crate::config::{AppConfig, ModuleIntegration};
use crate::graphql::{create_schema, GraphQLSchema};
use crate::providers::{
    BillingPublicApi, HttpBillingApi, HttpIdentityApi, HttpTrainingPlanApi, IdentityPublicApi,
    InProcessBillingApi, InProcessIdentityApi, InProcessTrainingPlanApi, PublicApiClient,
    TrainingPlanPublicApi,
};
use crate::repositories::Repositories;
use crate::services::{BillingService, PlanSubscriptionService, TrainingPlanService, UserService};

/// Everything a handler can reach
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub auth: AuthService,
    pub users: UserService,
    pub billing: BillingService,
    pub training_plans: TrainingPlanService,
    pub plan_subscriptions: PlanSubscriptionService,
    pub graphql: GraphQLSchema,
    pub module_integration: ModuleIntegration,
}

/// The three public APIs a module may call on the others
struct Providers {
    identity: Arc<dyn IdentityPublicApi>,
    billing: Arc<dyn BillingPublicApi>,
    training_plan: Arc<dyn TrainingPlanPublicApi>,
}

impl AppState {
    pub fn new(config: &AppConfig, repositories: Repositories) -> Result<Self> {
        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expires_in());
        let auth = AuthService::new(repositories.users.clone(), jwt_service.clone());
        let users = UserService::new(repositories.users.clone());
        let training_plans = TrainingPlanService::new(repositories.training_plans.clone());

        // Billing needs identity before the billing provider itself can exist
        let identity = identity_provider(config, &users, &jwt_service)?;
        let billing = BillingService::new(repositories.billing.clone(), identity.clone());
        let providers = Providers {
            identity,
            billing: billing_provider(config, &billing, &jwt_service)?,
            training_plan: training_plan_provider(config, &training_plans, &jwt_service)?,
        };

        let plan_subscriptions = PlanSubscriptionService::new(
            repositories.plan_subscriptions.clone(),
            repositories.training_plans.clone(),
            providers.identity,
            providers.training_plan,
            providers.billing,
        )
        .with_required_billing(config.require_active_billing);

        info!(
            "Module integration: {:?}, active billing required: {}",
            config.module_integration, config.require_active_billing
        );

        Ok(Self {
            graphql: create_schema(auth.clone()),
            jwt_service,
            auth,
            users,
            billing,
            training_plans,
            plan_subscriptions,
            module_integration: config.module_integration,
        })
    }
}

fn http_client(config: &AppConfig, base_url: &str, jwt_service: &JwtService) -> Result<PublicApiClient> {
    PublicApiClient::new(base_url, jwt_service.clone(), config.provider_timeout)
}

fn identity_provider(
    config: &AppConfig,
    users: &UserService,
    jwt_service: &JwtService,
) -> Result<Arc<dyn IdentityPublicApi>> {
    let provider: Arc<dyn IdentityPublicApi> = match config.module_integration {
        ModuleIntegration::InProcess => Arc::new(InProcessIdentityApi::new(users.clone())),
        ModuleIntegration::Http => Arc::new(HttpIdentityApi::new(http_client(
            config,
            &config.module_urls.identity,
            jwt_service,
        )?)),
    };
    Ok(provider)
}

fn billing_provider(
    config: &AppConfig,
    billing: &BillingService,
    jwt_service: &JwtService,
) -> Result<Arc<dyn BillingPublicApi>> {
    let provider: Arc<dyn BillingPublicApi> = match config.module_integration {
        ModuleIntegration::InProcess => Arc::new(InProcessBillingApi::new(billing.clone())),
        ModuleIntegration::Http => Arc::new(HttpBillingApi::new(http_client(
            config,
            &config.module_urls.billing,
            jwt_service,
        )?)),
    };
    Ok(provider)
}

fn training_plan_provider(
    config: &AppConfig,
    training_plans: &TrainingPlanService,
    jwt_service: &JwtService,
) -> Result<Arc<dyn TrainingPlanPublicApi>> {
    let provider: Arc<dyn TrainingPlanPublicApi> = match config.module_integration {
        ModuleIntegration::InProcess => Arc::new(InProcessTrainingPlanApi::new(training_plans.clone())),
        ModuleIntegration::Http => Arc::new(HttpTrainingPlanApi::new(http_client(
            config,
            &config.module_urls.training_plan,
            jwt_service,
        )?)),
    };
    Ok(provider)
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_service.clone()
    }
}
