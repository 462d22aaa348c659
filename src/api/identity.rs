use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::auth::UserSession;
use crate::errors::AppResult;
use crate::models::{CreateUserRequest, ExistsResponse, UpdateUserRequest, UserResponse};
use crate::state::AppState;

pub fn identity_routes(state: AppState) -> Router {
    Router::new()
        .route("/user", post(create_user))
        .route("/user/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/user/exists/:id", get(user_exists))
        .with_state(state)
}

/// Register a user. A bearer token is optional and only matters for admin creation.
#[tracing::instrument(skip(state, request))]
async fn create_user(
    State(state): State<AppState>,
    caller: Option<UserSession>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.users.create_user(request, caller.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[tracing::instrument(skip(state, _session))]
async fn get_user(
    State(state): State<AppState>,
    _session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user.into()))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_user(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.update_user(id, request, &session).await?;
    Ok(Json(user.into()))
}

#[tracing::instrument(skip(state, session))]
async fn delete_user(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.users.delete_user(id, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn user_exists(
    State(state): State<AppState>,
    _session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = state.users.user_exists(id).await?;
    Ok(Json(ExistsResponse { exists }))
}
