//! Enrollment rule engine.
//!
//! Every enrollment state change goes through here. The create and drop
//! paths run inside one transaction each: read current state, evaluate the
//! business rules in order, write, re-read the detail projection, commit.
//! The first failing rule determines the reported error; the storage-level
//! UNIQUE (student_id, class_offering_id) constraint backs the existence
//! check against concurrent double-enrollment.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::*;

use super::{parse_datetime, parse_uuid, student_by_user, Database};

/// Joined projection shared by every detail read. Callers append a WHERE /
/// ORDER BY clause.
const DETAILS_SELECT: &str =
    "SELECT e.id, e.student_id, s.first_name || ' ' || s.last_name, s.student_number,
            e.class_offering_id, co.offering_code, co.academic_period, co.schedule,
            co.subject_id, sub.code, sub.name, sub.description, sub.credits,
            co.professor_id, p.full_name, p.email, p.department,
            e.enrolled_at, e.status, e.final_grade, e.notes, e.created_at
     FROM enrollments e
     JOIN students s ON s.id = e.student_id
     JOIN class_offerings co ON co.id = e.class_offering_id
     JOIN subjects sub ON sub.id = co.subject_id
     JOIN professors p ON p.id = co.professor_id";

/// Offering state the create-enrollment rules are evaluated against.
struct OfferingSnapshot {
    offering_code: String,
    subject_name: String,
    professor_id: Uuid,
    professor_full_name: String,
    max_capacity: Option<i64>,
    is_active: bool,
}

impl Database {
    /// Enrolls the student owned by `user_id` in a class offering.
    ///
    /// The rules run in a fixed order and the first violation is returned:
    /// offering active, not already enrolled, under the per-student cap of
    /// [`MAX_ACTIVE_ENROLLMENTS`], no other Active enrollment with the same
    /// professor, offering under capacity. A prior Dropped enrollment for
    /// the pair is reactivated in place, clearing any earlier grade.
    pub fn create_enrollment(
        &self,
        user_id: Uuid,
        input: CreateEnrollmentInput,
    ) -> ServiceResult<EnrollmentDetails> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let student = student_by_user(&tx, user_id)?.ok_or_else(|| {
            ServiceError::not_found(format!(
                "No se encontró un perfil de estudiante para el usuario {}",
                user_id
            ))
        })?;

        let offering =
            offering_snapshot(&tx, input.class_offering_id)?.ok_or_else(|| {
                ServiceError::not_found(format!(
                    "La oferta de clase con ID {} no existe",
                    input.class_offering_id
                ))
            })?;

        if !offering.is_active {
            return Err(ServiceError::conflict(format!(
                "La oferta de clase '{}' no está activa",
                offering.offering_code
            )));
        }

        let existing: Option<(String, String)> = tx
            .query_row(
                "SELECT id, status FROM enrollments
                 WHERE student_id = ? AND class_offering_id = ?",
                [student.id.to_string(), input.class_offering_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        if matches!(&existing, Some((_, status)) if status == EnrollmentStatus::Active.as_str()) {
            return Err(ServiceError::conflict(format!(
                "Ya estás inscrito en la oferta '{}' - {}",
                offering.offering_code, offering.subject_name
            )));
        }

        let active_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM enrollments WHERE student_id = ? AND status = 'active'",
            [student.id.to_string()],
            |row| row.get(0),
        )?;
        if active_count >= MAX_ACTIVE_ENROLLMENTS {
            return Err(ServiceError::conflict(format!(
                "Has alcanzado el límite máximo de {} inscripciones activas. \
                 Debes cancelar una inscripción antes de agregar una nueva.",
                MAX_ACTIVE_ENROLLMENTS
            )));
        }

        let same_professor: i64 = tx.query_row(
            "SELECT COUNT(*) FROM enrollments e
             JOIN class_offerings co ON co.id = e.class_offering_id
             WHERE e.student_id = ? AND e.status = 'active' AND co.professor_id = ?",
            [student.id.to_string(), offering.professor_id.to_string()],
            |row| row.get(0),
        )?;
        if same_professor > 0 {
            return Err(ServiceError::conflict(format!(
                "Ya tienes una inscripción activa con el profesor {}. \
                 Todas tus inscripciones deben ser con profesores diferentes.",
                offering.professor_full_name
            )));
        }

        if let Some(capacity) = offering.max_capacity {
            let enrolled: i64 = tx.query_row(
                "SELECT COUNT(*) FROM enrollments
                 WHERE class_offering_id = ? AND status = 'active'",
                [input.class_offering_id.to_string()],
                |row| row.get(0),
            )?;
            if enrolled >= capacity {
                return Err(ServiceError::conflict(format!(
                    "La oferta de clase '{}' ha alcanzado su capacidad máxima",
                    offering.offering_code
                )));
            }
        }

        let now = Utc::now();
        let enrollment_id = match existing {
            // Reactivate the dropped row in place: same row id, refreshed
            // date, prior grade cleared.
            Some((id, status)) if status == EnrollmentStatus::Dropped.as_str() => {
                tx.execute(
                    "UPDATE enrollments
                     SET status = 'active', enrolled_at = ?, notes = ?,
                         final_grade = NULL, updated_at = ?
                     WHERE id = ?",
                    (now.to_rfc3339(), &input.notes, now.to_rfc3339(), &id),
                )?;
                parse_uuid(id)
            }
            _ => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO enrollments (id, student_id, class_offering_id, status,
                                              enrolled_at, notes, created_at)
                     VALUES (?, ?, ?, 'active', ?, ?, ?)",
                    (
                        id.to_string(),
                        student.id.to_string(),
                        input.class_offering_id.to_string(),
                        now.to_rfc3339(),
                        &input.notes,
                        now.to_rfc3339(),
                    ),
                )?;
                id
            }
        };

        let details = details_by_id(&tx, enrollment_id)?;
        tx.commit()?;

        tracing::debug!(
            "Student {} enrolled in {} ({})",
            details.student_number,
            details.offering_code,
            details.id
        );

        Ok(details)
    }

    /// Drops an Active enrollment. Only the owning student may drop it.
    pub fn drop_enrollment(
        &self,
        enrollment_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<EnrollmentDetails> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let row: Option<(String, String)> = tx
            .query_row(
                "SELECT e.status, s.user_id FROM enrollments e
                 JOIN students s ON s.id = e.student_id
                 WHERE e.id = ?",
                [enrollment_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (status, owner) = row.ok_or_else(|| {
            ServiceError::not_found(format!(
                "La inscripción con ID {} no existe",
                enrollment_id
            ))
        })?;

        if parse_uuid(owner) != user_id {
            return Err(ServiceError::permission_denied(
                "No tienes permiso para cancelar esta inscripción",
            ));
        }

        if status != EnrollmentStatus::Active.as_str() {
            let past = if status == EnrollmentStatus::Dropped.as_str() {
                "cancelada"
            } else {
                "completada"
            };
            return Err(ServiceError::conflict(format!(
                "La inscripción ya fue {} previamente",
                past
            )));
        }

        let now = Utc::now();
        tx.execute(
            "UPDATE enrollments SET status = 'dropped', updated_at = ? WHERE id = ?",
            (now.to_rfc3339(), enrollment_id.to_string()),
        )?;

        let details = details_by_id(&tx, enrollment_id)?;
        tx.commit()?;

        tracing::debug!(
            "Student {} dropped enrollment {} ({})",
            details.student_number,
            details.offering_code,
            details.id
        );

        Ok(details)
    }

    /// Lists the other Active enrollments on the same offering, ordered by
    /// student surname then first name. Only the enrollment's owner may look.
    pub fn get_classmates(
        &self,
        enrollment_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Vec<EnrollmentDetails>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT e.student_id, e.class_offering_id, s.user_id FROM enrollments e
                 JOIN students s ON s.id = e.student_id
                 WHERE e.id = ?",
                [enrollment_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (student_id, class_offering_id, owner) = row.ok_or_else(|| {
            ServiceError::not_found(format!(
                "La inscripción con ID {} no existe",
                enrollment_id
            ))
        })?;

        if parse_uuid(owner) != user_id {
            return Err(ServiceError::permission_denied(
                "No tienes permiso para ver los compañeros de esta clase",
            ));
        }

        let mut stmt = conn.prepare(&format!(
            "{DETAILS_SELECT}
             WHERE e.class_offering_id = ? AND e.status = 'active' AND e.student_id != ?
             ORDER BY s.last_name, s.first_name"
        ))?;

        let classmates = stmt
            .query_map([class_offering_id, student_id], details_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(classmates)
    }

    /// All enrollments of the student owned by `user_id`, any status, newest
    /// first.
    pub fn get_my_enrollments(&self, user_id: Uuid) -> ServiceResult<Vec<EnrollmentDetails>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let student = student_by_user(&conn, user_id)?.ok_or_else(|| {
            ServiceError::not_found(format!(
                "No se encontró un perfil de estudiante para el usuario {}",
                user_id
            ))
        })?;

        enrollments_of_student(&conn, student.id)
    }

    /// Same as [`Database::get_my_enrollments`], with each entry carrying the
    /// names of co-enrolled students. One bounded sub-query per enrollment;
    /// the cap of 3 keeps that constant.
    pub fn get_my_enrollments_with_classmates(
        &self,
        user_id: Uuid,
    ) -> ServiceResult<Vec<EnrollmentWithClassmates>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let student = student_by_user(&conn, user_id)?.ok_or_else(|| {
            ServiceError::not_found(format!(
                "No se encontró un perfil de estudiante para el usuario {}",
                user_id
            ))
        })?;

        let enrollments = enrollments_of_student(&conn, student.id)?;

        let mut stmt = conn.prepare(
            "SELECT s.first_name || ' ' || s.last_name FROM enrollments e
             JOIN students s ON s.id = e.student_id
             WHERE e.class_offering_id = ? AND e.status = 'active' AND e.student_id != ?
             ORDER BY s.last_name, s.first_name",
        )?;

        let mut result = Vec::with_capacity(enrollments.len());
        for details in enrollments {
            let classmates = stmt
                .query_map(
                    [
                        details.class_offering_id.to_string(),
                        student.id.to_string(),
                    ],
                    |row| row.get(0),
                )?
                .collect::<Result<Vec<String>, _>>()?;
            result.push(EnrollmentWithClassmates {
                details,
                classmates,
            });
        }

        Ok(result)
    }

    /// Reads the raw enrollment row, without the joined projection.
    pub fn get_enrollment(&self, id: Uuid) -> ServiceResult<Option<Enrollment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let enrollment = conn
            .query_row(
                "SELECT id, student_id, class_offering_id, status, enrolled_at,
                        final_grade, notes, created_at, updated_at
                 FROM enrollments WHERE id = ?",
                [id.to_string()],
                |row| {
                    Ok(Enrollment {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        student_id: parse_uuid(row.get::<_, String>(1)?),
                        class_offering_id: parse_uuid(row.get::<_, String>(2)?),
                        status: EnrollmentStatus::from_str(&row.get::<_, String>(3)?)
                            .unwrap_or(EnrollmentStatus::Active),
                        enrolled_at: parse_datetime(row.get::<_, String>(4)?),
                        final_grade: row.get(5)?,
                        notes: row.get(6)?,
                        created_at: parse_datetime(row.get::<_, String>(7)?),
                        updated_at: row.get::<_, Option<String>>(8)?.map(parse_datetime),
                    })
                },
            )
            .optional()?;
        Ok(enrollment)
    }

    /// Records a final grade on an enrollment. Grading has no HTTP surface;
    /// this hook exists so re-enrollment's grade clearing stays observable.
    pub fn set_final_grade(&self, enrollment_id: Uuid, grade: f64) -> ServiceResult<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let rows = conn.execute(
            "UPDATE enrollments SET final_grade = ?, updated_at = ? WHERE id = ?",
            (grade, now.to_rfc3339(), enrollment_id.to_string()),
        )?;
        if rows == 0 {
            return Err(ServiceError::not_found(format!(
                "La inscripción con ID {} no existe",
                enrollment_id
            )));
        }
        Ok(())
    }
}

fn offering_snapshot(conn: &Connection, id: Uuid) -> ServiceResult<Option<OfferingSnapshot>> {
    let snapshot = conn
        .query_row(
            "SELECT co.offering_code, sub.name, co.professor_id, p.full_name,
                    co.max_capacity, co.is_active
             FROM class_offerings co
             JOIN subjects sub ON sub.id = co.subject_id
             JOIN professors p ON p.id = co.professor_id
             WHERE co.id = ?",
            [id.to_string()],
            |row| {
                Ok(OfferingSnapshot {
                    offering_code: row.get(0)?,
                    subject_name: row.get(1)?,
                    professor_id: parse_uuid(row.get::<_, String>(2)?),
                    professor_full_name: row.get(3)?,
                    max_capacity: row.get(4)?,
                    is_active: row.get::<_, i32>(5)? != 0,
                })
            },
        )
        .optional()?;
    Ok(snapshot)
}

fn enrollments_of_student(
    conn: &Connection,
    student_id: Uuid,
) -> ServiceResult<Vec<EnrollmentDetails>> {
    let mut stmt = conn.prepare(&format!(
        "{DETAILS_SELECT} WHERE e.student_id = ? ORDER BY e.enrolled_at DESC"
    ))?;

    let enrollments = stmt
        .query_map([student_id.to_string()], details_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(enrollments)
}

fn details_by_id(conn: &Connection, id: Uuid) -> ServiceResult<EnrollmentDetails> {
    let mut stmt = conn.prepare(&format!("{DETAILS_SELECT} WHERE e.id = ?"))?;
    let details = stmt.query_row([id.to_string()], details_from_row)?;
    Ok(details)
}

fn details_from_row(row: &Row<'_>) -> rusqlite::Result<EnrollmentDetails> {
    Ok(EnrollmentDetails {
        id: parse_uuid(row.get::<_, String>(0)?),
        student_id: parse_uuid(row.get::<_, String>(1)?),
        student_full_name: row.get(2)?,
        student_number: row.get(3)?,
        class_offering_id: parse_uuid(row.get::<_, String>(4)?),
        offering_code: row.get(5)?,
        academic_period: row.get(6)?,
        schedule: row.get(7)?,
        subject_id: parse_uuid(row.get::<_, String>(8)?),
        subject_code: row.get(9)?,
        subject_name: row.get(10)?,
        subject_description: row.get(11)?,
        credits: row.get(12)?,
        professor_id: parse_uuid(row.get::<_, String>(13)?),
        professor_full_name: row.get(14)?,
        professor_email: row.get(15)?,
        professor_department: row.get(16)?,
        enrolled_at: parse_datetime(row.get::<_, String>(17)?),
        status: EnrollmentStatus::from_str(&row.get::<_, String>(18)?)
            .unwrap_or(EnrollmentStatus::Active),
        final_grade: row.get(19)?,
        notes: row.get(20)?,
        created_at: parse_datetime(row.get::<_, String>(21)?),
    })
}
