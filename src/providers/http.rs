use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use uuid::Uuid;

use super::{BillingPublicApi, IdentityPublicApi, TrainingPlanPublicApi};
use crate::auth::JwtService;
use crate::errors::{AppError, AppResult};
use crate::models::{ActiveSubscriptionResponse, ExistsResponse};

/// JSON-over-HTTP client for another module's public endpoints.
///
/// Every request carries a freshly minted service bearer token. Failures are
/// surfaced as upstream errors; there is no retry.
#[derive(Clone)]
pub struct PublicApiClient {
    client: reqwest::Client,
    base_url: String,
    jwt_service: JwtService,
}

impl PublicApiClient {
    pub fn new(base_url: &str, jwt_service: JwtService, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            jwt_service,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.jwt_service.create_service_token()?;

        debug!("Calling public API {}", url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Public API call to {} failed: {} - {}", url, status, error_text);
            return Err(AppError::Upstream(format!("{} returned {}", url, status)));
        }

        Ok(response.json::<T>().await?)
    }
}

#[derive(Clone)]
pub struct HttpIdentityApi {
    client: PublicApiClient,
}

impl HttpIdentityApi {
    pub fn new(client: PublicApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityPublicApi for HttpIdentityApi {
    async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        let response: ExistsResponse = self
            .client
            .get_json(&format!("/identity/user/exists/{}", user_id))
            .await?;
        Ok(response.exists)
    }
}

#[derive(Clone)]
pub struct HttpBillingApi {
    client: PublicApiClient,
}

impl HttpBillingApi {
    pub fn new(client: PublicApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BillingPublicApi for HttpBillingApi {
    async fn has_active_subscription(&self, user_id: Uuid) -> AppResult<bool> {
        let response: ActiveSubscriptionResponse = self
            .client
            .get_json(&format!("/billing/subscription/active/{}", user_id))
            .await?;
        Ok(response.active)
    }
}

#[derive(Clone)]
pub struct HttpTrainingPlanApi {
    client: PublicApiClient,
}

impl HttpTrainingPlanApi {
    pub fn new(client: PublicApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrainingPlanPublicApi for HttpTrainingPlanApi {
    async fn training_plan_exists(&self, training_plan_id: Uuid) -> AppResult<bool> {
        let response: ExistsResponse = self
            .client
            .get_json(&format!("/training-plan/exists/{}", training_plan_id))
            .await?;
        Ok(response.exists)
    }
}
