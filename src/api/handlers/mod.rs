//! Thin request handlers: validate input, delegate to [`Database`], map
//! results to JSON. All business rules live in the db layer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::api::middleware::{self, AuthUser};
use crate::api::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::models::*;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Auth
// ============================================================

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ServiceResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;
    let password_hash = middleware::hash_password(&input.password)?;
    let (user, student) = state.db.register_student(&input, &password_hash)?;
    let response = state.auth.issue_token(&user, Some(&student))?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> ServiceResult<Json<AuthResponse>> {
    let user = state
        .db
        .find_user_by_login(&input.username_or_email)?
        .ok_or_else(|| ServiceError::unauthorized("Credenciales inválidas"))?;

    if !user.is_active {
        return Err(ServiceError::unauthorized("La cuenta está desactivada"));
    }
    if !middleware::verify_password(&input.password, &user.password_hash) {
        return Err(ServiceError::unauthorized("Credenciales inválidas"));
    }

    let student = state.db.find_student_by_user(user.id)?;
    let response = state.auth.issue_token(&user, student.as_ref())?;
    Ok(Json(response))
}

// ============================================================
// Students
// ============================================================

pub async fn list_students(State(state): State<AppState>) -> ServiceResult<Json<Vec<Student>>> {
    state.db.get_all_students().map(Json)
}

pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<StudentProfile>> {
    state.db.get_my_profile(user_id).map(Json)
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServiceResult<Json<StudentProfile>> {
    state.db.get_student_profile(id).map(Json)
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(input): Json<UpdateStudentInput>,
) -> ServiceResult<Json<StudentProfile>> {
    input.validate()?;
    state.db.update_student(id, user_id, input).map(Json)
}

// ============================================================
// Catalog
// ============================================================

pub async fn list_class_offerings(
    State(state): State<AppState>,
) -> ServiceResult<Json<Vec<ClassOfferingSummary>>> {
    state.db.get_available_class_offerings().map(Json)
}

// ============================================================
// Enrollments
// ============================================================

pub async fn create_enrollment(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(input): Json<CreateEnrollmentInput>,
) -> ServiceResult<(StatusCode, Json<EnrollmentDetails>)> {
    state
        .db
        .create_enrollment(user_id, input)
        .map(|details| (StatusCode::CREATED, Json(details)))
}

pub async fn list_my_enrollments(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<Vec<EnrollmentDetails>>> {
    state.db.get_my_enrollments(user_id).map(Json)
}

pub async fn list_my_enrollments_with_classmates(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<Vec<EnrollmentWithClassmates>>> {
    state.db.get_my_enrollments_with_classmates(user_id).map(Json)
}

pub async fn drop_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<EnrollmentDetails>> {
    state.db.drop_enrollment(id, user_id).map(Json)
}

pub async fn list_classmates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ServiceResult<Json<Vec<EnrollmentDetails>>> {
    state.db.get_classmates(id, user_id).map(Json)
}
