use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::auth::bearer_token_from_headers;
use crate::graphql::BearerToken;
use crate::state::AppState;

pub fn graphql_routes(state: AppState) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(state)
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Executes a GraphQL request, handing the bearer token (if any) to resolvers
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Ok(token) = bearer_token_from_headers(&headers) {
        request = request.data(BearerToken(token.to_string()));
    }

    state.graphql.execute(request).await.into()
}
