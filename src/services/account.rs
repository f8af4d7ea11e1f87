/*
 * Responsibility
 * - register / login の薄い glue (user store + password hasher + token 発行)
 * - email は trim + lowercase してから扱う
 */
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::user_repo::{InMemoryUserRepo, NewUser, UserLookup, UserRecord};
use crate::services::auth::StrategyRouter;
use crate::services::auth::identity::{Role, normalize_email};
use crate::services::password::PasswordHasher;

/// Token + the account it was issued for.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<InMemoryUserRepo>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<StrategyRouter>,
}

impl AccountService {
    pub fn new(
        users: Arc<InMemoryUserRepo>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<StrategyRouter>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> Result<IssuedSession, AppError> {
        let password_digest = self.hasher.hash(password)?;

        let user = self
            .users
            .insert(NewUser {
                email: normalize_email(email),
                password_digest,
                role,
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "account registered");
        self.session_for(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AppError> {
        const INVALID: &str = "invalid email or password";

        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(AppError::Unauthorized(INVALID));
        };

        if !self.hasher.verify(password, &user.password_digest) {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(AppError::Unauthorized(INVALID));
        }

        self.session_for(&user)
    }

    fn session_for(&self, user: &UserRecord) -> Result<IssuedSession, AppError> {
        let token = self.tokens.generate_token(&user.identity())?;

        Ok(IssuedSession {
            token,
            user_id: user.id,
            role: user.role,
        })
    }
}
