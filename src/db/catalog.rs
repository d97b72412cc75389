//! Catalog operations: credit programs, subjects, professors and class
//! offerings, plus the availability listing the enrollment UI browses.

use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::*;

use super::{parse_datetime, parse_uuid, Database};

impl Database {
    // ============================================================
    // Credit program operations
    // ============================================================

    pub fn create_credit_program(
        &self,
        input: CreateCreditProgramInput,
    ) -> ServiceResult<CreditProgram> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO credit_programs (id, code, name, description, total_credits_required, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.code,
                &input.name,
                &input.description,
                input.total_credits_required,
                now.to_rfc3339(),
            ),
        )?;

        Ok(CreditProgram {
            id,
            code: input.code,
            name: input.name,
            description: input.description,
            total_credits_required: input.total_credits_required,
            created_at: now,
        })
    }

    pub fn get_credit_programs(&self) -> ServiceResult<Vec<CreditProgram>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, code, name, description, total_credits_required, created_at
             FROM credit_programs ORDER BY code",
        )?;

        let programs = stmt
            .query_map([], |row| {
                Ok(CreditProgram {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    code: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    total_credits_required: row.get(4)?,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(programs)
    }

    // ============================================================
    // Subject and professor operations
    // ============================================================

    pub fn create_subject(&self, input: CreateSubjectInput) -> ServiceResult<Subject> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO subjects (id, code, name, description, credits, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.code,
                &input.name,
                &input.description,
                input.credits,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Subject {
            id,
            code: input.code,
            name: input.name,
            description: input.description,
            credits: input.credits,
            created_at: now,
        })
    }

    pub fn create_professor(&self, input: CreateProfessorInput) -> ServiceResult<Professor> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO professors (id, employee_code, full_name, email, department, specialization, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.employee_code,
                &input.full_name,
                &input.email,
                &input.department,
                &input.specialization,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Professor {
            id,
            employee_code: input.employee_code,
            full_name: input.full_name,
            email: input.email,
            department: input.department,
            specialization: input.specialization,
            created_at: now,
        })
    }

    // ============================================================
    // Class offering operations
    // ============================================================

    pub fn create_class_offering(
        &self,
        input: CreateClassOfferingInput,
    ) -> ServiceResult<ClassOffering> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let subject_exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM subjects WHERE id = ?",
            [input.subject_id.to_string()],
            |row| row.get(0),
        )?;
        if subject_exists == 0 {
            return Err(ServiceError::not_found(format!(
                "La materia con ID {} no existe",
                input.subject_id
            )));
        }

        let professor_exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM professors WHERE id = ?",
            [input.professor_id.to_string()],
            |row| row.get(0),
        )?;
        if professor_exists == 0 {
            return Err(ServiceError::not_found(format!(
                "El profesor con ID {} no existe",
                input.professor_id
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO class_offerings (id, subject_id, professor_id, offering_code,
                                          academic_period, schedule, max_capacity, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)",
            (
                id.to_string(),
                input.subject_id.to_string(),
                input.professor_id.to_string(),
                &input.offering_code,
                &input.academic_period,
                &input.schedule,
                input.max_capacity,
                now.to_rfc3339(),
            ),
        )?;

        Ok(ClassOffering {
            id,
            subject_id: input.subject_id,
            professor_id: input.professor_id,
            offering_code: input.offering_code,
            academic_period: input.academic_period,
            schedule: input.schedule,
            max_capacity: input.max_capacity,
            is_active: true,
            created_at: now,
        })
    }

    pub fn deactivate_class_offering(&self, id: Uuid) -> ServiceResult<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE class_offerings SET is_active = 0 WHERE id = ?",
            [id.to_string()],
        )?;
        if rows == 0 {
            return Err(ServiceError::not_found(format!(
                "La oferta de clase con ID {} no existe",
                id
            )));
        }
        Ok(())
    }

    pub fn get_class_offering(&self, id: Uuid) -> ServiceResult<Option<ClassOffering>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let offering = conn
            .query_row(
                "SELECT id, subject_id, professor_id, offering_code, academic_period,
                        schedule, max_capacity, is_active, created_at
                 FROM class_offerings WHERE id = ?",
                [id.to_string()],
                |row| {
                    Ok(ClassOffering {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        subject_id: parse_uuid(row.get::<_, String>(1)?),
                        professor_id: parse_uuid(row.get::<_, String>(2)?),
                        offering_code: row.get(3)?,
                        academic_period: row.get(4)?,
                        schedule: row.get(5)?,
                        max_capacity: row.get(6)?,
                        is_active: row.get::<_, i32>(7)? != 0,
                        created_at: parse_datetime(row.get::<_, String>(8)?),
                    })
                },
            )
            .optional()?;
        Ok(offering)
    }

    /// Lists the active offerings with their current Active enrollment count,
    /// ordered by subject name then professor name.
    pub fn get_available_class_offerings(&self) -> ServiceResult<Vec<ClassOfferingSummary>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT co.id, co.offering_code, co.academic_period, co.schedule, co.max_capacity,
                    co.subject_id, sub.code, sub.name, sub.description, sub.credits,
                    co.professor_id, p.full_name, p.email, p.department,
                    (SELECT COUNT(*) FROM enrollments e
                     WHERE e.class_offering_id = co.id AND e.status = 'active'),
                    co.is_active
             FROM class_offerings co
             JOIN subjects sub ON sub.id = co.subject_id
             JOIN professors p ON p.id = co.professor_id
             WHERE co.is_active = 1
             ORDER BY sub.name, p.full_name",
        )?;

        let offerings = stmt
            .query_map([], |row| {
                let max_capacity: Option<i64> = row.get(4)?;
                let current_enrollment_count: i64 = row.get(14)?;
                Ok(ClassOfferingSummary {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    offering_code: row.get(1)?,
                    academic_period: row.get(2)?,
                    schedule: row.get(3)?,
                    max_capacity,
                    subject_id: parse_uuid(row.get::<_, String>(5)?),
                    subject_code: row.get(6)?,
                    subject_name: row.get(7)?,
                    subject_description: row.get(8)?,
                    credits: row.get(9)?,
                    professor_id: parse_uuid(row.get::<_, String>(10)?),
                    professor_full_name: row.get(11)?,
                    professor_email: row.get(12)?,
                    professor_department: row.get(13)?,
                    current_enrollment_count,
                    has_available_spots: max_capacity
                        .map_or(true, |cap| current_enrollment_count < cap),
                    is_active: row.get::<_, i32>(15)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(offerings)
    }
}
