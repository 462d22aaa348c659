mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn test_create_and_read_training_plan() {
    let app = TestApp::new();
    let coach = app.register("coach@example.com", "coach").await;
    let (plan_id, day_ids) = app.create_training_plan(&coach, 3).await;
    assert_eq!(day_ids.len(), 3);

    let (status, plan) = app.get(&format!("/training-plan/{}", plan_id), &coach.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["author_id"], json!(coach.id));
    assert_eq!(plan["difficulty"], "beginner");
    assert_eq!(plan["days"][0]["day_number"], 1);
    assert_eq!(plan["days"][2]["exercises"][0]["name"], "Squat");
    assert_eq!(plan["days"][2]["exercises"][0]["rest_seconds"], 0);

    let (status, list) = app.get("/training-plan?limit=10", &coach.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, exists) = app.get(&format!("/training-plan/exists/{}", plan_id), &coach.token).await;
    assert_eq!(exists, json!({ "exists": true }));
    let (_, missing) = app
        .get(&format!("/training-plan/exists/{}", Uuid::new_v4()), &coach.token)
        .await;
    assert_eq!(missing, json!({ "exists": false }));
}

#[tokio::test]
async fn test_athletes_cannot_create_plans() {
    let app = TestApp::new();
    let athlete = app.register("athlete@example.com", "athlete").await;

    let (status, _) = app
        .post("/training-plan", Some(&athlete.token), json!({ "name": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_appending_days_and_exercises() {
    let app = TestApp::new();
    let coach = app.register("coach@example.com", "coach").await;
    let (plan_id, _) = app.create_training_plan(&coach, 1).await;

    let (status, _) = app
        .post(
            &format!("/training-plan/{}/day", plan_id),
            Some(&coach.token),
            json!({ "day_number": 1, "title": "Again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, day) = app
        .post(
            &format!("/training-plan/{}/day", plan_id),
            Some(&coach.token),
            json!({ "day_number": 2, "title": "Intervals" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, exercise) = app
        .post(
            &format!("/training-plan/day/{}/exercise", day["id"].as_str().unwrap()),
            Some(&coach.token),
            json!({ "name": "400m repeats", "sets": 6, "repetitions": 1, "rest_seconds": 90 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(exercise["position"], 1);

    let (status, _) = app
        .post(
            &format!("/training-plan/day/{}/exercise", day["id"].as_str().unwrap()),
            Some(&coach.token),
            json!({ "name": "Bad", "sets": 0, "repetitions": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_author_or_admin_can_change_a_plan() {
    let app = TestApp::new();
    let author = app.register("author@example.com", "coach").await;
    let rival = app.register("rival@example.com", "coach").await;
    let admin = app.admin().await;
    let (plan_id, _) = app.create_training_plan(&author, 1).await;
    let uri = format!("/training-plan/{}", plan_id);

    let (status, _) = app.put(&uri, &rival.token, Some(json!({ "name": "Stolen" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, plan) = app
        .put(&uri, &admin.token, Some(json!({ "difficulty": "advanced" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["difficulty"], "advanced");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&author.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, &author.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
