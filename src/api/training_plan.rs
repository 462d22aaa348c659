use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::auth::UserSession;
use crate::errors::AppResult;
use crate::models::{
    CreateDayRequest, CreateExerciseRequest, CreateTrainingPlanRequest, DayDetail, Exercise, ExistsResponse,
    TrainingPlan, TrainingPlanDetail, TrainingPlanQuery, UpdateTrainingPlanRequest,
};
use crate::state::AppState;

pub fn training_plan_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_training_plan).get(list_training_plans))
        .route(
            "/:id",
            get(get_training_plan)
                .put(update_training_plan)
                .delete(delete_training_plan),
        )
        .route("/:id/day", post(add_day))
        .route("/day/:day_id/exercise", post(add_exercise))
        .route("/exists/:id", get(training_plan_exists))
        .with_state(state)
}

#[tracing::instrument(skip(state, session, request))]
async fn create_training_plan(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<CreateTrainingPlanRequest>,
) -> AppResult<(StatusCode, Json<TrainingPlanDetail>)> {
    let plan = state.training_plans.create_plan(&session, request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn list_training_plans(
    State(state): State<AppState>,
    _session: UserSession,
    Query(query): Query<TrainingPlanQuery>,
) -> AppResult<Json<Vec<TrainingPlan>>> {
    Ok(Json(state.training_plans.list_plans(&query).await?))
}

async fn get_training_plan(
    State(state): State<AppState>,
    _session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingPlanDetail>> {
    Ok(Json(state.training_plans.get_plan(id).await?))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_training_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTrainingPlanRequest>,
) -> AppResult<Json<TrainingPlan>> {
    Ok(Json(state.training_plans.update_plan(id, request, &session).await?))
}

#[tracing::instrument(skip(state, session))]
async fn delete_training_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.training_plans.delete_plan(id, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, session, request))]
async fn add_day(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateDayRequest>,
) -> AppResult<(StatusCode, Json<DayDetail>)> {
    let day = state.training_plans.add_day(id, request, &session).await?;
    Ok((StatusCode::CREATED, Json(day)))
}

#[tracing::instrument(skip(state, session, request))]
async fn add_exercise(
    State(state): State<AppState>,
    session: UserSession,
    Path(day_id): Path<Uuid>,
    Json(request): Json<CreateExerciseRequest>,
) -> AppResult<(StatusCode, Json<Exercise>)> {
    let exercise = state.training_plans.add_exercise(day_id, request, &session).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn training_plan_exists(
    State(state): State<AppState>,
    _session: UserSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = state.training_plans.plan_exists(id).await?;
    Ok(Json(ExistsResponse { exists }))
}
