use async_graphql::{Context, ErrorExtensions, Object, Result};

use super::schema::{BearerToken, GraphQLContext};
use super::types::{AccessTokenObject, UserObject};
use crate::auth::{AuthError, SignInRequest};
use crate::errors::AppError;

/// GraphQL error carrying the same `code` as the REST error body
fn graphql_error(err: AppError) -> async_graphql::Error {
    let code = err.error_code();
    let message = match &err {
        AppError::Database(_) | AppError::Internal(_) => {
            tracing::error!("GraphQL resolver failed: {}", err);
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };

    async_graphql::Error::new(message).extend_with(|_, extensions| extensions.set("code", code))
}

pub struct Query;

#[Object]
impl Query {
    /// Profile of the user identified by the request's bearer token
    async fn get_profile(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let context = ctx.data::<GraphQLContext>()?;
        let token = ctx
            .data_opt::<BearerToken>()
            .ok_or_else(|| graphql_error(AuthError::MissingAuthHeader.into()))?;

        let session = context
            .auth
            .validate_session(&token.0)
            .map_err(|err| graphql_error(err.into()))?;
        let user = context.auth.profile(&session).await.map_err(graphql_error)?;

        Ok(user.into())
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    async fn sign_in(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AccessTokenObject> {
        let context = ctx.data::<GraphQLContext>()?;
        let token = context
            .auth
            .sign_in(SignInRequest { email, password })
            .await
            .map_err(graphql_error)?;

        Ok(token.into())
    }
}
