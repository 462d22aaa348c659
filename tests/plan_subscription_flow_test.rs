mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn test_enrollment_requires_active_billing() {
    let app = TestApp::new();
    let coach = app.register("coach@example.com", "coach").await;
    let athlete = app.register("athlete@example.com", "athlete").await;
    let (plan_id, _) = app.create_training_plan(&coach, 2).await;
    let uri = format!("/training-plan/subscription/{}/{}", plan_id, athlete.id);

    let (status, body) = app.post(&uri, Some(&athlete.token), serde_json::Value::Null).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let admin = app.admin().await;
    app.give_active_billing(&admin, &athlete).await;

    let (status, subscription) = app.post(&uri, Some(&athlete.token), serde_json::Value::Null).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subscription["status"], "notStarted");

    let (status, _) = app.post(&uri, Some(&athlete.token), serde_json::Value::Null).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_enrollment_existence_checks() {
    let app = TestApp::with_env(&[("REQUIRE_ACTIVE_BILLING", "false")]);
    let coach = app.register("coach@example.com", "coach").await;
    let admin = app.admin().await;
    let (plan_id, _) = app.create_training_plan(&coach, 1).await;

    let (status, body) = app
        .post(
            &format!("/training-plan/subscription/{}/{}", plan_id, Uuid::new_v4()),
            Some(&admin.token),
            serde_json::Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let athlete = app.register("athlete@example.com", "athlete").await;
    let (status, body) = app
        .post(
            &format!("/training-plan/subscription/{}/{}", Uuid::new_v4(), athlete.id),
            Some(&athlete.token),
            serde_json::Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Training plan not found");

    let (status, _) = app
        .post(
            &format!("/training-plan/subscription/{}/{}", plan_id, athlete.id),
            Some(&coach.token),
            serde_json::Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_machine_over_http() {
    let app = TestApp::with_env(&[("REQUIRE_ACTIVE_BILLING", "false")]);
    let coach = app.register("coach@example.com", "coach").await;
    let athlete = app.register("athlete@example.com", "athlete").await;
    let (plan_id, day_ids) = app.create_training_plan(&coach, 4).await;
    let pair = format!("{}/{}", plan_id, athlete.id);
    let send = |target: &str| format!("/training-plan/subscription/send/{}/{}", target, pair);
    let progress = |day_id: &str| format!("/training-plan/subscription/progress/{}/{}", pair, day_id);

    let (status, _) = app
        .post(
            &format!("/training-plan/subscription/{}", pair),
            Some(&athlete.token),
            serde_json::Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // notStarted cannot jump straight to completed
    let (status, body) = app.put(&send("completed"), &athlete.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot move plan subscription from notStarted to completed");

    let (status, _) = app.put(&progress(&day_ids[0]), &athlete.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, started) = app.put(&send("in-progress"), &athlete.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "inProgress");
    assert!(started["started_at"].is_string());

    let (status, summary) = app.put(&progress(&day_ids[0]), &athlete.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["completed_days"], 1);
    assert_eq!(summary["total_days"], 4);
    assert_eq!(summary["progress_percentage"], 25.0);

    let (status, _) = app.put(&progress(&day_ids[0]), &athlete.token, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.put(&progress(&Uuid::new_v4().to_string()), &athlete.token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, canceled) = app.put(&send("canceled"), &athlete.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canceled["status"], "canceled");

    let (status, restarted) = app.put(&send("not-started"), &athlete.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restarted["status"], "notStarted");
    assert!(restarted["started_at"].is_null());

    let (status, summary) = app
        .get(&format!("/training-plan/subscription/{}", pair), &athlete.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["completed_days"], 0);

    app.put(&send("in-progress"), &athlete.token, None).await;
    let (status, completed) = app.put(&send("completed"), &athlete.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    // completed is terminal
    for target in ["in-progress", "completed", "canceled", "not-started"] {
        let (status, _) = app.put(&send(target), &athlete.token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "completed -> {}", target);
    }

    let (status, list) = app
        .get(&format!("/training-plan/subscription/user/{}", athlete.id), &athlete.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_days_of_other_plans_are_rejected() {
    let app = TestApp::with_env(&[("REQUIRE_ACTIVE_BILLING", "false")]);
    let coach = app.register("coach@example.com", "coach").await;
    let athlete = app.register("athlete@example.com", "athlete").await;
    let (plan_id, _) = app.create_training_plan(&coach, 1).await;
    let (_, foreign_days) = app.create_training_plan(&coach, 1).await;
    let pair = format!("{}/{}", plan_id, athlete.id);

    app.post(
        &format!("/training-plan/subscription/{}", pair),
        Some(&athlete.token),
        serde_json::Value::Null,
    )
    .await;
    app.put(
        &format!("/training-plan/subscription/send/in-progress/{}", pair),
        &athlete.token,
        None,
    )
    .await;

    let (status, _) = app
        .put(
            &format!("/training-plan/subscription/progress/{}/{}", pair, foreign_days[0]),
            &athlete.token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
