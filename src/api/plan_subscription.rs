use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use crate::auth::UserSession;
use crate::errors::AppResult;
use crate::models::{PlanSubscription, PlanSubscriptionProgress, PlanSubscriptionStatus};
use crate::state::AppState;

/// Enrollment routes, nested under `/training-plan`
pub fn plan_subscription_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/subscription/:training_plan_id/:user_id",
            post(subscribe).get(get_progress),
        )
        .route("/subscription/user/:user_id", get(list_user_plan_subscriptions))
        .route("/subscription/send/in-progress/:training_plan_id/:user_id", put(send_in_progress))
        .route("/subscription/send/completed/:training_plan_id/:user_id", put(send_completed))
        .route("/subscription/send/canceled/:training_plan_id/:user_id", put(send_canceled))
        .route("/subscription/send/not-started/:training_plan_id/:user_id", put(send_not_started))
        .route(
            "/subscription/progress/:training_plan_id/:user_id/:day_id",
            put(complete_day),
        )
        .with_state(state)
}

#[tracing::instrument(skip(state, session))]
async fn subscribe(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<(StatusCode, Json<PlanSubscription>)> {
    let subscription = state
        .plan_subscriptions
        .subscribe(training_plan_id, user_id, &session)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn get_progress(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<PlanSubscriptionProgress>> {
    let progress = state
        .plan_subscriptions
        .get_progress(training_plan_id, user_id, &session)
        .await?;
    Ok(Json(progress))
}

async fn list_user_plan_subscriptions(
    State(state): State<AppState>,
    session: UserSession,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<PlanSubscription>>> {
    Ok(Json(state.plan_subscriptions.list_for_user(user_id, &session).await?))
}

async fn send_to(
    state: AppState,
    session: UserSession,
    training_plan_id: Uuid,
    user_id: Uuid,
    next: PlanSubscriptionStatus,
) -> AppResult<Json<PlanSubscription>> {
    let subscription = state
        .plan_subscriptions
        .change_status(training_plan_id, user_id, next, &session)
        .await?;
    Ok(Json(subscription))
}

#[tracing::instrument(skip(state, session))]
async fn send_in_progress(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<PlanSubscription>> {
    send_to(state, session, training_plan_id, user_id, PlanSubscriptionStatus::InProgress).await
}

#[tracing::instrument(skip(state, session))]
async fn send_completed(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<PlanSubscription>> {
    send_to(state, session, training_plan_id, user_id, PlanSubscriptionStatus::Completed).await
}

#[tracing::instrument(skip(state, session))]
async fn send_canceled(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<PlanSubscription>> {
    send_to(state, session, training_plan_id, user_id, PlanSubscriptionStatus::Canceled).await
}

#[tracing::instrument(skip(state, session))]
async fn send_not_started(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<PlanSubscription>> {
    send_to(state, session, training_plan_id, user_id, PlanSubscriptionStatus::NotStarted).await
}

#[tracing::instrument(skip(state, session))]
async fn complete_day(
    State(state): State<AppState>,
    session: UserSession,
    Path((training_plan_id, user_id, day_id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<Json<PlanSubscriptionProgress>> {
    let progress = state
        .plan_subscriptions
        .complete_day(training_plan_id, user_id, day_id, &session)
        .await?;
    Ok(Json(progress))
}
