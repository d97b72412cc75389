use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Academic profile of a registered student, owned 1:1 by a [`User`].
///
/// Students are never hard-deleted; `is_active` soft-deactivates them.
///
/// [`User`]: crate::models::User
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    pub credit_program_id: Uuid,
    /// Date the student joined the institution (not a class enrollment).
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Detailed profile view: student + account + credit program, assembled from
/// one joined read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub student_number: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub credit_program_id: Uuid,
    pub credit_program_code: String,
    pub credit_program_name: String,
    pub credit_program_description: String,
    pub total_credits_required: i64,
    /// All enrollments of the student, regardless of status.
    pub current_enrollments_count: i64,
}

/// Input for updating a student's personal data. Only the owning user may
/// apply it; academic fields (student number, credit program) are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStudentInput {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
}

impl UpdateStudentInput {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(ServiceError::validation("El nombre es requerido"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ServiceError::validation("Los apellidos son requeridos"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(ServiceError::validation("El teléfono es requerido"));
        }
        if self.address.trim().is_empty() {
            return Err(ServiceError::validation("La dirección es requerida"));
        }
        Ok(())
    }
}
