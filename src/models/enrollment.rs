use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most Active enrollments a student may hold at once.
pub const MAX_ACTIVE_ENROLLMENTS: i64 = 3;

/// A student's registration against one class offering.
///
/// At most one row exists per (student, offering) pair. Re-enrolling after a
/// drop reactivates the dropped row instead of inserting a new one, so the
/// row id is stable across drop/re-enroll cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_offering_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub final_grade: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Enrollment lifecycle state.
///
/// - `Active`: currently enrolled
/// - `Dropped`: cancelled by the student, may be reactivated
/// - `Completed`: finished with a grade, terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Dropped,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dropped => "dropped",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "dropped" => Some(Self::Dropped),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Flattened read projection of one enrollment: the enrollment row joined
/// with its student, class offering, subject and professor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentDetails {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_full_name: String,
    pub student_number: String,
    pub class_offering_id: Uuid,
    pub offering_code: String,
    pub academic_period: String,
    pub schedule: String,
    pub subject_id: Uuid,
    pub subject_code: String,
    pub subject_name: String,
    pub subject_description: String,
    pub credits: i64,
    pub professor_id: Uuid,
    pub professor_full_name: String,
    pub professor_email: String,
    pub professor_department: String,
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    pub final_grade: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// [`EnrollmentDetails`] extended with the full names of the other Active
/// students on the same offering, ordered by surname then first name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentWithClassmates {
    #[serde(flatten)]
    pub details: EnrollmentDetails,
    pub classmates: Vec<String>,
}

/// Input for enrolling the authenticated student in a class offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEnrollmentInput {
    pub class_offering_id: Uuid,
    pub notes: Option<String>,
}
