// Shared helpers for driving the full router over in-memory storage

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use fitness_platform::api::create_routes;
use fitness_platform::auth::{hash_password, PasswordPolicy, SignInRequest, UserRole};
use fitness_platform::config::AppConfig;
use fitness_platform::models::User;
use fitness_platform::repositories::{Repositories, UserRepository};
use fitness_platform::state::AppState;

pub const PASSWORD: &str = "Password123";

/// A signed-in user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repositories: Repositories,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Build the app with configuration overrides on top of the defaults
    pub fn with_env(pairs: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("JWT_SECRET".to_string(), "test_secret_key_for_testing_only".to_string());
        for (key, value) in pairs {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let repositories = Repositories::in_memory();
        let state = AppState::new(&config, repositories.clone()).unwrap();

        Self {
            router: create_routes(state.clone()),
            state,
            repositories,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), body).await
    }

    /// Register through the public endpoint, then sign in
    pub async fn register(&self, email: &str, role: &str) -> TestUser {
        let (status, body) = self
            .post(
                "/identity/user",
                None,
                json!({ "name": "Test User", "email": email, "password": PASSWORD, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

        self.sign_in(body["id"].as_str().unwrap().parse().unwrap(), email).await
    }

    /// Admins cannot self-register, so they are seeded straight into the store
    pub async fn admin(&self) -> TestUser {
        let now = Utc::now();
        let email = format!("admin-{}@example.com", Uuid::new_v4());
        let user = User {
            id: Uuid::new_v4(),
            name: "Admin".to_string(),
            email: email.clone(),
            password_hash: hash_password(PASSWORD, &PasswordPolicy::default()).unwrap(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.repositories.users.insert(&user).await.unwrap();

        self.sign_in(user.id, &email).await
    }

    async fn sign_in(&self, id: Uuid, email: &str) -> TestUser {
        let token = self
            .state
            .auth
            .sign_in(SignInRequest {
                email: email.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        TestUser {
            id,
            email: email.to_string(),
            token: token.access_token,
        }
    }

    /// Creates a monthly billing plan and subscribes `user` to it
    pub async fn give_active_billing(&self, admin: &TestUser, user: &TestUser) {
        let (status, plan) = self
            .post(
                "/billing/plan",
                Some(&admin.token),
                json!({
                    "name": format!("Plan {}", Uuid::new_v4()),
                    "price_cents": 1500,
                    "currency": "USD",
                    "interval": "monthly"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "plan creation failed: {}", plan);

        let (status, body) = self
            .post(
                "/billing/subscription",
                Some(&user.token),
                json!({ "user_id": user.id, "plan_id": plan["id"] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "subscription failed: {}", body);
    }

    /// Creates a plan with `days` empty days authored by `coach`; returns (plan id, day ids)
    pub async fn create_training_plan(&self, coach: &TestUser, days: i32) -> (String, Vec<String>) {
        let days: Vec<Value> = (1..=days)
            .map(|day_number| {
                json!({
                    "day_number": day_number,
                    "title": format!("Day {}", day_number),
                    "exercises": [{ "name": "Squat", "sets": 3, "repetitions": 8 }]
                })
            })
            .collect();

        let (status, body) = self
            .post(
                "/training-plan",
                Some(&coach.token),
                json!({ "name": "Base building", "difficulty": "beginner", "days": days }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "training plan creation failed: {}", body);

        let plan_id = body["id"].as_str().unwrap().to_string();
        let day_ids = body["days"]
            .as_array()
            .unwrap()
            .iter()
            .map(|day| day["id"].as_str().unwrap().to_string())
            .collect();

        (plan_id, day_ids)
    }
}
