/*
 * Responsibility
 * - auth 系の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::identity::Role;

const MIN_PASSWORD_LEN: usize = 6;

fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("email is required");
    }
    if !email.contains('@') {
        return Err("invalid email format");
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("password must be at least 6 characters");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.first_name.trim().is_empty() {
            return Err("first_name is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub authorities: Vec<String>,
}
