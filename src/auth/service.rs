use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{verify_password, AccessToken, AuthError, JwtService, SignInRequest, UserSession};
use crate::errors::{AppError, AppResult};
use crate::models::{normalize_email, User};
use crate::repositories::UserRepository;

/// Sign-in and profile lookups backed by the identity store
#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_service: JwtService) -> Self {
        Self { jwt_service, users }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Exchange email + password for an access token
    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<AccessToken> {
        let email = normalize_email(&request.email);

        // Unknown email and wrong password are indistinguishable to the caller
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Sign-in attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(&request.password, &user.password_hash).map_err(AuthError::from)? {
            warn!("Sign-in attempt with wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self
            .jwt_service
            .create_access_token(user.id, &user.email, user.role)?;

        info!("User {} signed in", user.id);

        Ok(AccessToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
        })
    }

    /// Validate a raw bearer token
    pub fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        self.jwt_service.extract_user_session(token)
    }

    /// Current user for an authenticated session
    pub async fn profile(&self, session: &UserSession) -> AppResult<User> {
        self.users
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }
}
