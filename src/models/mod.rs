// Domain models for identity, billing and training plans

pub mod billing;
pub mod plan_subscription;
pub mod training_plan;
pub mod user;
pub mod validation;

pub use billing::*;
pub use plan_subscription::*;
pub use training_plan::*;
pub use user::*;
pub use validation::*;
