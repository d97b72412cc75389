//! JWT authentication: token issuance and validation, password hashing,
//! and the bearer-token middleware protecting the API.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{AuthResponse, Student, User};

use super::AppState;

/// Token signing configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 signing secret (from MATRICULA_JWT_SECRET).
    secret: String,
    /// Token lifetime in seconds (from MATRICULA_TOKEN_LIFETIME_SECS).
    token_lifetime_secs: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("MATRICULA_JWT_SECRET")
            .unwrap_or_else(|_| "matricula-dev-secret-change-me".to_string());
        let token_lifetime_secs = std::env::var("MATRICULA_TOKEN_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8 * 60 * 60);
        Self {
            secret,
            token_lifetime_secs,
        }
    }

    /// Create a config with a fixed secret (for testing).
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_lifetime_secs: 3600,
        }
    }

    /// Signs a token for the account and builds the auth response the
    /// register/login endpoints return.
    pub fn issue_token(
        &self,
        user: &User,
        student: Option<&Student>,
    ) -> ServiceResult<AuthResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.token_lifetime_secs);

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            student_id: student.map(|s| s.id.to_string()),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_at,
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            student_id: student.map(|s| s.id),
            student_full_name: student.map(|s| s.full_name()),
            student_number: student.map(|s| s.student_number.clone()),
        })
    }

    /// Validates a token's signature and expiry.
    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::unauthorized("Token inválido o expirado"))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: String,
    pub student_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated user id, inserted as a request extension by
/// [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// Rejects requests without a valid bearer token and forwards the
/// authenticated user id to the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServiceError::unauthorized("Token de autenticación requerido"))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ServiceError::unauthorized("Token de autenticación requerido"))?;

    let claims = state.auth.validate_token(token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ServiceError::unauthorized("Token inválido o expirado"))?;

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}

fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
