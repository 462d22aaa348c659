use async_graphql::{EmptySubscription, Schema};

use super::resolvers::{Mutation, Query};
use crate::auth::AuthService;

/// Shared data available to every resolver
pub struct GraphQLContext {
    pub auth: AuthService,
}

/// Raw bearer token from the `Authorization` header of the current request
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

pub type GraphQLSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn create_schema(auth: AuthService) -> GraphQLSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(GraphQLContext { auth })
        .finish()
}
