use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingPlan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub author_id: Uuid,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "training_plan_difficulty", rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Day {
    pub id: Uuid,
    pub training_plan_id: Uuid,
    pub day_number: i32,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub day_id: Uuid,
    pub name: String,
    pub sets: i32,
    pub repetitions: i32,
    pub rest_seconds: i32,
    pub notes: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A day together with its ordered exercises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayDetail {
    #[serde(flatten)]
    pub day: Day,
    pub exercises: Vec<Exercise>,
}

/// A plan with its days ordered by `day_number`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlanDetail {
    #[serde(flatten)]
    pub plan: TrainingPlan,
    pub days: Vec<DayDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub sets: i32,
    pub repetitions: i32,
    #[serde(default)]
    pub rest_seconds: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDayRequest {
    pub day_number: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<CreateExerciseRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrainingPlanRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub days: Vec<CreateDayRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTrainingPlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingPlanQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TrainingPlanQuery {
    /// Clamp paging to sane bounds
    pub fn page(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(50).clamp(1, 100);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
