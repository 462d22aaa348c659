use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::auth::{require_plan_author_role, AuthError, UserSession};
use crate::errors::{AppError, AppResult};
use crate::models::{
    validate_name, validate_non_negative, validate_positive, CreateDayRequest, CreateExerciseRequest,
    CreateTrainingPlanRequest, Day, DayDetail, Exercise, TrainingPlan, TrainingPlanDetail, TrainingPlanQuery,
    UpdateTrainingPlanRequest,
};
use crate::repositories::TrainingPlanRepository;

fn validation(err: anyhow::Error) -> AppError {
    AppError::Validation(err.to_string())
}

fn validate_exercise(request: &CreateExerciseRequest) -> AppResult<()> {
    validate_name("Exercise name", &request.name).map_err(validation)?;
    validate_positive("Sets", request.sets).map_err(validation)?;
    validate_positive("Repetitions", request.repetitions).map_err(validation)?;
    validate_non_negative("Rest seconds", i64::from(request.rest_seconds)).map_err(validation)?;
    Ok(())
}

fn validate_day(request: &CreateDayRequest) -> AppResult<()> {
    validate_positive("Day number", request.day_number).map_err(validation)?;
    validate_name("Day title", &request.title).map_err(validation)?;
    request.exercises.iter().try_for_each(validate_exercise)
}

fn build_exercise(day_id: Uuid, position: i32, request: CreateExerciseRequest, now: DateTime<Utc>) -> Exercise {
    Exercise {
        id: Uuid::new_v4(),
        day_id,
        name: request.name.trim().to_string(),
        sets: request.sets,
        repetitions: request.repetitions,
        rest_seconds: request.rest_seconds,
        notes: request.notes,
        position,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// Builds a day and its exercises, numbering exercises in request order
fn build_day(training_plan_id: Uuid, request: CreateDayRequest, now: DateTime<Utc>) -> (Day, Vec<Exercise>) {
    let day = Day {
        id: Uuid::new_v4(),
        training_plan_id,
        day_number: request.day_number,
        title: request.title.trim().to_string(),
        description: request.description,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    let exercises = request
        .exercises
        .into_iter()
        .enumerate()
        .map(|(index, exercise)| build_exercise(day.id, index as i32 + 1, exercise, now))
        .collect();

    (day, exercises)
}

/// Training plan authoring and lookups
#[derive(Clone)]
pub struct TrainingPlanService {
    repo: Arc<dyn TrainingPlanRepository>,
}

impl TrainingPlanService {
    pub fn new(repo: Arc<dyn TrainingPlanRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_plan(
        &self,
        author: &UserSession,
        request: CreateTrainingPlanRequest,
    ) -> AppResult<TrainingPlanDetail> {
        require_plan_author_role(author)?;
        validate_name("Training plan name", &request.name).map_err(validation)?;

        let mut day_numbers = HashSet::new();
        for day in &request.days {
            validate_day(day)?;
            if !day_numbers.insert(day.day_number) {
                return Err(AppError::Validation(format!(
                    "Day number {} appears more than once",
                    day.day_number
                )));
            }
        }

        let now = Utc::now();
        let plan = TrainingPlan {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            author_id: author.user_id,
            difficulty: request.difficulty,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let mut days = Vec::with_capacity(request.days.len());
        let mut exercises = Vec::new();
        for day_request in request.days {
            let (day, day_exercises) = build_day(plan.id, day_request, now);
            days.push(day);
            exercises.extend(day_exercises);
        }

        self.repo.insert_plan(&plan, &days, &exercises).await?;
        info!(
            "Created training plan {} with {} days by {}",
            plan.id,
            days.len(),
            author.user_id
        );

        Ok(assemble_detail(plan, days, exercises))
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<TrainingPlanDetail> {
        let plan = self.find_plan(plan_id).await?;
        let days = self.repo.list_days(plan.id).await?;
        let day_ids: Vec<Uuid> = days.iter().map(|day| day.id).collect();
        let exercises = self.repo.list_exercises(&day_ids).await?;

        Ok(assemble_detail(plan, days, exercises))
    }

    pub async fn list_plans(&self, query: &TrainingPlanQuery) -> AppResult<Vec<TrainingPlan>> {
        let (limit, offset) = query.page();
        Ok(self.repo.list_plans(limit, offset).await?)
    }

    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        request: UpdateTrainingPlanRequest,
        caller: &UserSession,
    ) -> AppResult<TrainingPlan> {
        let mut plan = self.find_owned_plan(plan_id, caller).await?;

        if let Some(name) = request.name {
            validate_name("Training plan name", &name).map_err(validation)?;
            plan.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            plan.description = description;
        }
        if let Some(difficulty) = request.difficulty {
            plan.difficulty = difficulty;
        }

        plan.updated_at = Utc::now();
        self.repo.update_plan(&plan).await?;
        info!("Updated training plan {}", plan.id);

        Ok(plan)
    }

    pub async fn delete_plan(&self, plan_id: Uuid, caller: &UserSession) -> AppResult<()> {
        let plan = self.find_owned_plan(plan_id, caller).await?;

        if !self.repo.soft_delete_plan(plan.id, Utc::now()).await? {
            return Err(AppError::not_found("Training plan"));
        }

        info!("Deleted training plan {}", plan.id);
        Ok(())
    }

    pub async fn add_day(&self, plan_id: Uuid, request: CreateDayRequest, caller: &UserSession) -> AppResult<DayDetail> {
        let plan = self.find_owned_plan(plan_id, caller).await?;
        validate_day(&request)?;

        let existing = self.repo.list_days(plan.id).await?;
        if existing.iter().any(|day| day.day_number == request.day_number) {
            return Err(AppError::conflict(format!(
                "Day {} already exists in this training plan",
                request.day_number
            )));
        }

        let (day, exercises) = build_day(plan.id, request, Utc::now());
        self.repo.insert_day_with_exercises(&day, &exercises).await?;

        info!("Added day {} to training plan {}", day.day_number, plan.id);
        Ok(DayDetail { day, exercises })
    }

    /// Appends an exercise after the day's current last position
    pub async fn add_exercise(
        &self,
        day_id: Uuid,
        request: CreateExerciseRequest,
        caller: &UserSession,
    ) -> AppResult<Exercise> {
        let day = self
            .repo
            .find_day(day_id)
            .await?
            .ok_or_else(|| AppError::not_found("Day"))?;
        self.find_owned_plan(day.training_plan_id, caller).await?;
        validate_exercise(&request)?;

        let position = self
            .repo
            .list_exercises(&[day.id])
            .await?
            .iter()
            .map(|exercise| exercise.position)
            .max()
            .unwrap_or(0)
            + 1;

        let exercise = build_exercise(day.id, position, request, Utc::now());
        self.repo.insert_exercise(&exercise).await?;
        info!("Added exercise {} to day {}", exercise.id, day.id);

        Ok(exercise)
    }

    pub async fn plan_exists(&self, plan_id: Uuid) -> AppResult<bool> {
        Ok(self.repo.plan_exists(plan_id).await?)
    }

    async fn find_plan(&self, plan_id: Uuid) -> AppResult<TrainingPlan> {
        self.repo
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Training plan"))
    }

    /// Only the author or an admin may change a plan
    async fn find_owned_plan(&self, plan_id: Uuid, caller: &UserSession) -> AppResult<TrainingPlan> {
        let plan = self.find_plan(plan_id).await?;
        if !caller.can_act_for(plan.author_id) {
            return Err(AuthError::InsufficientPermissions.into());
        }
        Ok(plan)
    }
}

fn assemble_detail(plan: TrainingPlan, mut days: Vec<Day>, exercises: Vec<Exercise>) -> TrainingPlanDetail {
    let mut by_day: HashMap<Uuid, Vec<Exercise>> = HashMap::new();
    for exercise in exercises {
        by_day.entry(exercise.day_id).or_default().push(exercise);
    }

    days.sort_by_key(|day| day.day_number);
    let days = days
        .into_iter()
        .map(|day| {
            let mut exercises = by_day.remove(&day.id).unwrap_or_default();
            exercises.sort_by_key(|exercise| exercise.position);
            DayDetail { day, exercises }
        })
        .collect();

    TrainingPlanDetail { plan, days }
}
