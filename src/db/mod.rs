//! SQLite-backed persistence layer.
//!
//! A single [`Database`] handle wraps the connection behind a mutex; every
//! mutating operation locks it, runs inside one transaction, and commits
//! before returning. Account and profile operations live here; the catalog
//! and the enrollment rule engine live in their sibling modules.

mod catalog;
mod enrollments;
mod schema;
mod seed;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::*;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "matricula")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("matricula.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Account operations
    // ============================================================

    /// Registers a user account and its student profile in one transaction.
    ///
    /// The caller validates the input and hashes the password beforehand;
    /// this only enforces the uniqueness and referential checks.
    pub fn register_student(
        &self,
        input: &RegisterInput,
        password_hash: &str,
    ) -> ServiceResult<(User, Student)> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let username_taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?",
            [&input.username],
            |row| row.get(0),
        )?;
        if username_taken > 0 {
            return Err(ServiceError::conflict(format!(
                "El nombre de usuario '{}' ya está en uso",
                input.username
            )));
        }

        let email_taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?",
            [&input.email],
            |row| row.get(0),
        )?;
        if email_taken > 0 {
            return Err(ServiceError::conflict(format!(
                "El email '{}' ya está registrado",
                input.email
            )));
        }

        let number_taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM students WHERE student_number = ?",
            [&input.student_number],
            |row| row.get(0),
        )?;
        if number_taken > 0 {
            return Err(ServiceError::conflict(format!(
                "El número de estudiante '{}' ya está en uso",
                input.student_number
            )));
        }

        let program_exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM credit_programs WHERE id = ?",
            [input.credit_program_id.to_string()],
            |row| row.get(0),
        )?;
        if program_exists == 0 {
            return Err(ServiceError::conflict(format!(
                "El programa de créditos con ID {} no existe",
                input.credit_program_id
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: password_hash.to_string(),
            role: Role::Student,
            is_active: true,
            created_at: now,
        };

        tx.execute(
            "INSERT INTO users (id, username, email, password_hash, role, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, 1, ?)",
            (
                user.id.to_string(),
                &user.username,
                &user.email,
                &user.password_hash,
                user.role.as_str(),
                now.to_rfc3339(),
            ),
        )?;

        let student = Student {
            id: Uuid::new_v4(),
            user_id: user.id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            student_number: input.student_number.clone(),
            date_of_birth: input.date_of_birth,
            phone_number: input.phone_number.clone(),
            address: input.address.clone(),
            credit_program_id: input.credit_program_id,
            registered_at: now,
            is_active: true,
            created_at: now,
            updated_at: None,
        };

        tx.execute(
            "INSERT INTO students (id, user_id, first_name, last_name, student_number,
                                   date_of_birth, phone_number, address, credit_program_id,
                                   registered_at, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
            (
                student.id.to_string(),
                student.user_id.to_string(),
                &student.first_name,
                &student.last_name,
                &student.student_number,
                student.date_of_birth.to_string(),
                &student.phone_number,
                &student.address,
                student.credit_program_id.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        tx.commit()?;
        tracing::debug!("Registered student {} ({})", student.student_number, user.username);

        Ok((user, student))
    }

    /// Looks an account up by username or email for login.
    pub fn find_user_by_login(&self, username_or_email: &str) -> ServiceResult<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, is_active, created_at
             FROM users WHERE username = ? OR email = ?",
        )?;

        let mut rows = stmt.query([username_or_email, username_or_email])?;
        if let Some(row) = rows.next()? {
            Ok(Some(user_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn find_student_by_user(&self, user_id: Uuid) -> ServiceResult<Option<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        student_by_user(&conn, user_id)
    }

    // ============================================================
    // Student profile operations
    // ============================================================

    pub fn get_all_students(&self) -> ServiceResult<Vec<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "{STUDENT_SELECT} WHERE is_active = 1 ORDER BY last_name, first_name"
        ))?;

        let students = stmt
            .query_map([], student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }

    pub fn get_student_profile(&self, student_id: Uuid) -> ServiceResult<StudentProfile> {
        let conn = self.conn.lock().expect("database lock poisoned");
        profile_where(&conn, "s.id = ?", student_id)?.ok_or_else(|| {
            ServiceError::not_found(format!("Estudiante con ID {} no encontrado", student_id))
        })
    }

    pub fn get_my_profile(&self, user_id: Uuid) -> ServiceResult<StudentProfile> {
        let conn = self.conn.lock().expect("database lock poisoned");
        profile_where(&conn, "s.user_id = ?", user_id)?.ok_or_else(|| {
            ServiceError::not_found(format!(
                "No se encontró un perfil de estudiante para el usuario {}",
                user_id
            ))
        })
    }

    /// Updates a student's personal fields. Only the owning user may do so;
    /// academic fields are immutable here.
    pub fn update_student(
        &self,
        student_id: Uuid,
        user_id: Uuid,
        input: UpdateStudentInput,
    ) -> ServiceResult<StudentProfile> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let owner: Option<String> = conn
            .query_row(
                "SELECT user_id FROM students WHERE id = ?",
                [student_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let owner = owner.ok_or_else(|| {
            ServiceError::not_found(format!("Estudiante con ID {} no encontrado", student_id))
        })?;
        if parse_uuid(owner) != user_id {
            return Err(ServiceError::permission_denied(
                "No tienes permiso para actualizar este perfil",
            ));
        }

        let now = Utc::now();
        conn.execute(
            "UPDATE students SET first_name = ?, last_name = ?, date_of_birth = ?,
                                 phone_number = ?, address = ?, updated_at = ?
             WHERE id = ?",
            (
                &input.first_name,
                &input.last_name,
                input.date_of_birth.to_string(),
                &input.phone_number,
                &input.address,
                now.to_rfc3339(),
                student_id.to_string(),
            ),
        )?;

        profile_where(&conn, "s.id = ?", student_id)?.ok_or_else(|| {
            ServiceError::internal(format!("Student {} vanished during update", student_id))
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Row mapping helpers shared across the db modules
// ============================================================

const STUDENT_SELECT: &str = "SELECT id, user_id, first_name, last_name, student_number,
            date_of_birth, phone_number, address, credit_program_id,
            registered_at, is_active, created_at, updated_at
     FROM students";

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: parse_uuid(row.get::<_, String>(0)?),
        user_id: parse_uuid(row.get::<_, String>(1)?),
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        student_number: row.get(4)?,
        date_of_birth: parse_date(row.get::<_, String>(5)?),
        phone_number: row.get(6)?,
        address: row.get(7)?,
        credit_program_id: parse_uuid(row.get::<_, String>(8)?),
        registered_at: parse_datetime(row.get::<_, String>(9)?),
        is_active: row.get::<_, i32>(10)? != 0,
        created_at: parse_datetime(row.get::<_, String>(11)?),
        updated_at: row.get::<_, Option<String>>(12)?.map(parse_datetime),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get::<_, String>(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::from_str(&row.get::<_, String>(4)?).unwrap_or(Role::Student),
        is_active: row.get::<_, i32>(5)? != 0,
        created_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

/// Resolves the student profile owned by a user id, on an already-held
/// connection or transaction.
fn student_by_user(conn: &Connection, user_id: Uuid) -> ServiceResult<Option<Student>> {
    let mut stmt = conn.prepare(&format!("{STUDENT_SELECT} WHERE user_id = ?"))?;
    let mut rows = stmt.query([user_id.to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(student_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn profile_where(
    conn: &Connection,
    clause: &str,
    param: Uuid,
) -> ServiceResult<Option<StudentProfile>> {
    let sql = format!(
        "SELECT s.id, s.user_id, u.username, u.email, s.first_name, s.last_name,
                s.student_number, s.date_of_birth, s.phone_number, s.address,
                s.registered_at, s.is_active, s.created_at,
                s.credit_program_id, cp.code, cp.name, cp.description, cp.total_credits_required,
                (SELECT COUNT(*) FROM enrollments e WHERE e.student_id = s.id)
         FROM students s
         JOIN users u ON u.id = s.user_id
         JOIN credit_programs cp ON cp.id = s.credit_program_id
         WHERE {clause}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let mut rows = stmt.query([param.to_string()])?;
    if let Some(row) = rows.next()? {
        let first_name: String = row.get(4)?;
        let last_name: String = row.get(5)?;
        Ok(Some(StudentProfile {
            id: parse_uuid(row.get::<_, String>(0)?),
            user_id: parse_uuid(row.get::<_, String>(1)?),
            username: row.get(2)?,
            email: row.get(3)?,
            full_name: format!("{} {}", first_name, last_name),
            first_name,
            last_name,
            student_number: row.get(6)?,
            date_of_birth: parse_date(row.get::<_, String>(7)?),
            phone_number: row.get(8)?,
            address: row.get(9)?,
            registered_at: parse_datetime(row.get::<_, String>(10)?),
            is_active: row.get::<_, i32>(11)? != 0,
            created_at: parse_datetime(row.get::<_, String>(12)?),
            credit_program_id: parse_uuid(row.get::<_, String>(13)?),
            credit_program_code: row.get(14)?,
            credit_program_name: row.get(15)?,
            credit_program_description: row.get(16)?,
            total_credits_required: row.get(17)?,
            current_enrollments_count: row.get(18)?,
        }))
    } else {
        Ok(None)
    }
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: String) -> NaiveDate {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}
