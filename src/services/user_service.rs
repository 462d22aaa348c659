use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, AuthError, PasswordPolicy, UserRole, UserSession};
use crate::errors::{AppError, AppResult};
use crate::models::{
    normalize_email, validate_email, validate_name, CreateUserRequest, UpdateUserRequest, User,
};
use crate::repositories::UserRepository;

/// Identity module use cases
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    password_policy: PasswordPolicy,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            password_policy: PasswordPolicy::default(),
        }
    }

    pub fn with_password_policy(mut self, password_policy: PasswordPolicy) -> Self {
        self.password_policy = password_policy;
        self
    }

    /// Register a user. Self-registration may pick `athlete` or `coach`;
    /// only an admin caller can create another admin.
    pub async fn create_user(&self, request: CreateUserRequest, caller: Option<&UserSession>) -> AppResult<User> {
        let role = request.role.unwrap_or(UserRole::Athlete);
        if role == UserRole::Admin && !caller.map(UserSession::is_admin).unwrap_or(false) {
            return Err(AuthError::InsufficientPermissions.into());
        }

        validate_name("Name", &request.name).map_err(|e| AppError::Validation(e.to_string()))?;
        let email = normalize_email(&request.email);
        validate_email(&email).map_err(|e| AppError::Validation(e.to_string()))?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Rejected registration for an email already in use");
            return Err(AppError::conflict("Email already exists"));
        }

        let password_hash = hash_password(&request.password, &self.password_policy).map_err(AuthError::from)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.users.insert(&user).await?;
        info!("Created user {} with role {}", user.id, user.role.as_str());

        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
        caller: &UserSession,
    ) -> AppResult<User> {
        if !caller.can_act_for(user_id) {
            return Err(AuthError::InsufficientPermissions.into());
        }

        let mut user = self.get_user(user_id).await?;

        if let Some(name) = request.name {
            validate_name("Name", &name).map_err(|e| AppError::Validation(e.to_string()))?;
            user.name = name.trim().to_string();
        }

        if let Some(email) = request.email {
            let email = normalize_email(&email);
            validate_email(&email).map_err(|e| AppError::Validation(e.to_string()))?;

            if email != user.email {
                if let Some(other) = self.users.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(AppError::conflict("Email already exists"));
                    }
                }
                user.email = email;
            }
        }

        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        info!("Updated user {}", user.id);

        Ok(user)
    }

    pub async fn delete_user(&self, user_id: Uuid, caller: &UserSession) -> AppResult<()> {
        if !caller.can_act_for(user_id) {
            return Err(AuthError::InsufficientPermissions.into());
        }

        if !self.users.soft_delete(user_id, Utc::now()).await? {
            return Err(AppError::not_found("User"));
        }

        info!("Deleted user {}", user_id);
        Ok(())
    }

    pub async fn user_exists(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.users.exists(user_id).await?)
    }
}
