mod common;

use axum::http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{TestApp, PASSWORD};

async fn graphql(app: &TestApp, token: Option<&str>, query: &str, variables: Value) -> Value {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(axum::body::Body::from(
            json!({ "query": query, "variables": variables }).to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const SIGN_IN: &str = r#"
    mutation SignIn($email: String!, $password: String!) {
        signIn(email: $email, password: $password) { accessToken tokenType expiresIn }
    }
"#;

const PROFILE: &str = "query { getProfile { id name email role } }";

#[tokio::test]
async fn test_sign_in_then_get_profile() {
    let app = TestApp::new();
    let user = app.register("graph@example.com", "coach").await;

    let signed_in = graphql(
        &app,
        None,
        SIGN_IN,
        json!({ "email": "GRAPH@example.com", "password": PASSWORD }),
    )
    .await;
    assert!(signed_in.get("errors").is_none(), "{}", signed_in);
    assert_eq!(signed_in["data"]["signIn"]["tokenType"], "Bearer");
    assert_eq!(signed_in["data"]["signIn"]["expiresIn"], 3600);
    let token = signed_in["data"]["signIn"]["accessToken"].as_str().unwrap().to_string();

    let profile = graphql(&app, Some(&token), PROFILE, Value::Null).await;
    assert_eq!(profile["data"]["getProfile"]["id"], json!(user.id));
    assert_eq!(profile["data"]["getProfile"]["email"], "graph@example.com");
    assert_eq!(profile["data"]["getProfile"]["role"], "coach");
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let app = TestApp::new();
    app.register("graph@example.com", "athlete").await;

    let response = graphql(
        &app,
        None,
        SIGN_IN,
        json!({ "email": "graph@example.com", "password": "Wrong12345" }),
    )
    .await;
    assert_eq!(response["errors"][0]["message"], "Invalid credentials");
    assert_eq!(response["errors"][0]["extensions"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_profile_requires_a_token() {
    let app = TestApp::new();

    let response = graphql(&app, None, PROFILE, Value::Null).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "MISSING_AUTH_HEADER");

    let response = graphql(&app, Some("not-a-jwt"), PROFILE, Value::Null).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "INVALID_TOKEN");
}
