use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::billing::billing_routes;
use super::graphql::graphql_routes;
use super::health::health_check;
use super::identity::identity_routes;
use super::plan_subscription::plan_subscription_routes;
use super::training_plan::training_plan_routes;
use crate::auth::{cors_layer, security_headers_layer};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone())
        .nest("/identity", identity_routes(state.clone()))
        .nest("/billing", billing_routes(state.clone()))
        .nest(
            "/training-plan",
            training_plan_routes(state.clone()).merge(plan_subscription_routes(state.clone())),
        )
        .merge(graphql_routes(state))
        .layer(security_headers_layer())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
