//! Registration and login against the local user table, issuing the
//! signed bearer token the API expects.

use bcrypt::{DEFAULT_COST, hash, verify};
use db::models::user::{User, UserPublic};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("todos os campos são obrigatórios")]
    MissingFields,
    #[error("email já cadastrado")]
    EmailTaken,
    #[error("usuário não encontrado")]
    UserNotFound,
    #[error("senha incorreta")]
    InvalidPassword,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct AuthSession {
    pub token: String,
    pub user: UserPublic,
}

pub struct AuthService;

impl AuthService {
    pub async fn register(
        pool: &SqlitePool,
        jwt_secret: &str,
        request: &RegisterRequest,
    ) -> Result<AuthSession, AuthError> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if User::find_by_email(pool, &request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash(&request.password, DEFAULT_COST)?;
        let user = User::create(pool, &request.name, &request.email, &password_hash).await?;
        info!(user_id = user.id, "user registered");

        let token = utils::jwt::mint(jwt_secret, user.id, &user.email)?;
        Ok(AuthSession {
            token,
            user: user.into(),
        })
    }

    pub async fn login(
        pool: &SqlitePool,
        jwt_secret: &str,
        request: &LoginRequest,
    ) -> Result<AuthSession, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let user = User::find_by_email(pool, &request.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !verify(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidPassword);
        }

        let token = utils::jwt::mint(jwt_secret, user.id, &user.email)?;
        Ok(AuthSession {
            token,
            user: user.into(),
        })
    }
}
