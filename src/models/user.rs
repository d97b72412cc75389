use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Authentication account. Holds credentials only; academic data lives on
/// the associated [`Student`](crate::models::Student) profile.
///
/// Never serialized to API clients (the password hash must not leave the
/// server); responses use [`AuthResponse`] instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Input for registering a new user + student profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    pub credit_program_id: Uuid,
}

impl RegisterInput {
    /// Validates the registration payload before it reaches the store.
    pub fn validate(&self) -> ServiceResult<()> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(ServiceError::validation("El nombre de usuario es requerido"));
        }
        if username.len() < 3 {
            return Err(ServiceError::validation(
                "El nombre de usuario debe tener al menos 3 caracteres",
            ));
        }
        if username.len() > 50 {
            return Err(ServiceError::validation(
                "El nombre de usuario no puede exceder 50 caracteres",
            ));
        }
        if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ServiceError::validation(
                "El nombre de usuario solo puede contener letras, números y guiones bajos",
            ));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(ServiceError::validation("El email es requerido"));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(ServiceError::validation("El email no tiene un formato válido"));
        }

        validate_password(&self.password)?;
        if self.confirm_password != self.password {
            return Err(ServiceError::validation("Las contraseñas no coinciden"));
        }

        if self.first_name.trim().is_empty() {
            return Err(ServiceError::validation("El nombre es requerido"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ServiceError::validation("Los apellidos son requeridos"));
        }

        let number = self.student_number.trim();
        if number.is_empty() {
            return Err(ServiceError::validation("El número de estudiante es requerido"));
        }
        if !number.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            return Err(ServiceError::validation(
                "El número de estudiante solo puede contener letras mayúsculas y números",
            ));
        }

        validate_birth_date(self.date_of_birth)?;

        if self.phone_number.trim().is_empty() {
            return Err(ServiceError::validation("El teléfono es requerido"));
        }
        if self.address.trim().is_empty() {
            return Err(ServiceError::validation("La dirección es requerida"));
        }

        Ok(())
    }
}

/// Input for logging in. Accepts the username or the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

/// Response to a successful register/login: the bearer token plus enough
/// account/student context for the client to bootstrap its session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub student_id: Option<Uuid>,
    pub student_full_name: Option<String>,
    pub student_number: Option<String>,
}

fn validate_password(password: &str) -> ServiceResult<()> {
    if password.is_empty() {
        return Err(ServiceError::validation("La contraseña es requerida"));
    }
    if password.len() < 6 {
        return Err(ServiceError::validation(
            "La contraseña debe tener al menos 6 caracteres",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ServiceError::validation(
            "La contraseña debe contener al menos una letra mayúscula",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ServiceError::validation(
            "La contraseña debe contener al menos una letra minúscula",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ServiceError::validation(
            "La contraseña debe contener al menos un número",
        ));
    }
    Ok(())
}

fn validate_birth_date(date_of_birth: NaiveDate) -> ServiceResult<()> {
    let today = Utc::now().date_naive();
    let min_age_cutoff = today
        .with_year(today.year() - 16)
        .unwrap_or(today);
    if date_of_birth > min_age_cutoff {
        return Err(ServiceError::validation(
            "Debes tener al menos 16 años para registrarte",
        ));
    }
    let max_age_cutoff = today
        .with_year(today.year() - 100)
        .unwrap_or(today);
    if date_of_birth < max_age_cutoff {
        return Err(ServiceError::validation("La fecha de nacimiento no es válida"));
    }
    Ok(())
}
