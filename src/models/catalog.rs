use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credit scheme a student registers under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditProgram {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub total_credits_required: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub specialization: String,
    pub created_at: DateTime<Utc>,
}

/// One subject taught by one professor in an academic period.
///
/// `max_capacity` is optional; offerings without it accept unlimited
/// enrollments. Deactivated offerings stay in the catalog for existing
/// enrollments but reject new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassOffering {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub professor_id: Uuid,
    pub offering_code: String,
    pub academic_period: String,
    pub schedule: String,
    pub max_capacity: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Catalog listing entry: offering + subject + professor plus the current
/// Active enrollment count and whether a spot is still free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassOfferingSummary {
    pub id: Uuid,
    pub offering_code: String,
    pub academic_period: String,
    pub schedule: String,
    pub max_capacity: Option<i64>,
    pub subject_id: Uuid,
    pub subject_code: String,
    pub subject_name: String,
    pub subject_description: String,
    pub credits: i64,
    pub professor_id: Uuid,
    pub professor_full_name: String,
    pub professor_email: String,
    pub professor_department: String,
    pub current_enrollment_count: i64,
    /// Capacity unset, or current Active count below it.
    pub has_available_spots: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCreditProgramInput {
    pub code: String,
    pub name: String,
    pub description: String,
    pub total_credits_required: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectInput {
    pub code: String,
    pub name: String,
    pub description: String,
    pub credits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessorInput {
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassOfferingInput {
    pub subject_id: Uuid,
    pub professor_id: Uuid,
    pub offering_code: String,
    pub academic_period: String,
    pub schedule: String,
    pub max_capacity: Option<i64>,
}
