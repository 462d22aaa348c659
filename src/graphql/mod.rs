// GraphQL surface: signIn mutation and getProfile query

pub mod resolvers;
pub mod schema;
pub mod types;

pub use resolvers::{Mutation, Query};
pub use schema::{create_schema, BearerToken, GraphQLContext, GraphQLSchema};
