// Use cases of the identity, billing and training plan modules

pub mod billing_service;
pub mod plan_subscription_service;
pub mod training_plan_service;
pub mod user_service;

pub use billing_service::BillingService;
pub use plan_subscription_service::PlanSubscriptionService;
pub use training_plan_service::TrainingPlanService;
pub use user_service::UserService;
