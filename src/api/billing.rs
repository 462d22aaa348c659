use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{require_admin, AuthError, UserSession};
use crate::errors::AppResult;
use crate::models::{
    ActiveSubscriptionResponse, BillingPlan, CreateBillingPlanRequest, CreateSubscriptionRequest, Subscription,
    UpdateBillingPlanRequest,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PlanListQuery {
    /// Honoured for admins only
    pub include_inactive: Option<bool>,
}

pub fn billing_routes(state: AppState) -> Router {
    Router::new()
        .route("/plan", post(create_plan).get(list_plans))
        .route("/plan/:id", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/subscription", post(subscribe))
        .route("/subscription/user/:user_id", get(list_user_subscriptions))
        .route("/subscription/cancel/:id", put(cancel_subscription))
        .route("/subscription/active/:user_id", get(has_active_subscription))
        .with_state(state)
}

#[tracing::instrument(skip(state, session, request))]
async fn create_plan(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<CreateBillingPlanRequest>,
) -> AppResult<(StatusCode, Json<BillingPlan>)> {
    require_admin(&session)?;
    let plan = state.billing.create_plan(request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn list_plans(
    State(state): State<AppState>,
    session: UserSession,
    Query(query): Query<PlanListQuery>,
) -> AppResult<Json<Vec<BillingPlan>>> {
    let include_inactive = session.is_admin() && query.include_inactive.unwrap_or(false);
    let plans = state.billing.list_plans(include_inactive).await?;
    Ok(Json(plans))
}

async fn get_plan(
    State(state): State<AppState>,
    _session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BillingPlan>> {
    Ok(Json(state.billing.get_plan(id).await?))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBillingPlanRequest>,
) -> AppResult<Json<BillingPlan>> {
    require_admin(&session)?;
    Ok(Json(state.billing.update_plan(id, request).await?))
}

#[tracing::instrument(skip(state, session))]
async fn delete_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&session)?;
    state.billing.delete_plan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, session))]
async fn subscribe(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<CreateSubscriptionRequest>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    if !session.can_act_for(request.user_id) {
        return Err(AuthError::InsufficientPermissions.into());
    }

    let subscription = state.billing.subscribe(request).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn list_user_subscriptions(
    State(state): State<AppState>,
    session: UserSession,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<Subscription>>> {
    if !session.can_act_for(user_id) {
        return Err(AuthError::InsufficientPermissions.into());
    }

    Ok(Json(state.billing.list_user_subscriptions(user_id).await?))
}

#[tracing::instrument(skip(state, session))]
async fn cancel_subscription(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Subscription>> {
    Ok(Json(state.billing.cancel_subscription(id, &session).await?))
}

async fn has_active_subscription(
    State(state): State<AppState>,
    session: UserSession,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ActiveSubscriptionResponse>> {
    if !session.can_act_for(user_id) {
        return Err(AuthError::InsufficientPermissions.into());
    }

    let active = state.billing.has_active_subscription(user_id).await?;
    Ok(Json(ActiveSubscriptionResponse { active }))
}
