// REST and GraphQL routes and handlers

pub mod billing;
pub mod graphql;
pub mod health;
pub mod identity;
pub mod plan_subscription;
pub mod routes;
pub mod training_plan;

pub use routes::create_routes;
