//! Demo catalog seeder.
//!
//! Loads the academic catalog the registration flows expect: 3 credit
//! programs, 10 subjects, 5 professors, and 10 class offerings with each
//! professor teaching exactly 2 subjects. Idempotent: a database that
//! already has credit programs is left untouched.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ServiceResult;

use super::Database;

const ACADEMIC_PERIOD: &str = "2025-1";

const CREDIT_PROGRAMS: &[(&str, &str, &str, i64)] = &[
    (
        "PROG-STD",
        "Programa Estándar",
        "Programa académico estándar con requisitos regulares de créditos",
        120,
    ),
    (
        "PROG-INT",
        "Programa Intensivo",
        "Programa intensivo con mayor carga académica y menor duración",
        150,
    ),
    (
        "PROG-FLEX",
        "Programa Flexible",
        "Programa flexible que permite al estudiante avanzar a su propio ritmo",
        100,
    ),
];

// All subjects are worth 3 credits.
const SUBJECTS: &[(&str, &str, &str)] = &[
    (
        "MAT101",
        "Matemáticas Fundamentales",
        "Fundamentos de álgebra, cálculo y matemáticas discretas",
    ),
    (
        "PROG101",
        "Programación I",
        "Introducción a la programación orientada a objetos",
    ),
    (
        "DB101",
        "Bases de Datos",
        "Diseño, modelado e implementación de bases de datos relacionales",
    ),
    (
        "WEB101",
        "Desarrollo Web",
        "Desarrollo de aplicaciones web con HTML, CSS, JavaScript y frameworks modernos",
    ),
    (
        "ALG101",
        "Algoritmos y Estructuras de Datos",
        "Análisis y diseño de algoritmos eficientes",
    ),
    (
        "NET101",
        "Redes de Computadoras",
        "Fundamentos de redes, protocolos TCP/IP y arquitecturas de red",
    ),
    (
        "SEC101",
        "Seguridad Informática",
        "Principios de seguridad, criptografía y protección de sistemas",
    ),
    (
        "AI101",
        "Inteligencia Artificial",
        "Fundamentos de IA, machine learning y deep learning",
    ),
    (
        "MOB101",
        "Desarrollo Móvil",
        "Desarrollo de aplicaciones móviles multiplataforma",
    ),
    (
        "CLOUD101",
        "Cloud Computing",
        "Computación en la nube y arquitecturas distribuidas",
    ),
];

const PROFESSORS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "PROF001",
        "Dr. Carlos Alberto Martínez Ruiz",
        "cmartinez@universidad.edu",
        "Matemáticas y Ciencias Básicas",
        "Álgebra y Cálculo Avanzado",
    ),
    (
        "PROF002",
        "Dra. Ana María García Fernández",
        "agarcia@universidad.edu",
        "Ingeniería de Software",
        "Programación Orientada a Objetos y Desarrollo Web",
    ),
    (
        "PROF003",
        "Dr. Luis Fernando Rodríguez López",
        "lrodriguez@universidad.edu",
        "Sistemas de Información",
        "Bases de Datos y Sistemas Distribuidos",
    ),
    (
        "PROF004",
        "Dra. María del Carmen López Sánchez",
        "mlopez@universidad.edu",
        "Infraestructura y Redes",
        "Redes de Computadoras y Seguridad Informática",
    ),
    (
        "PROF005",
        "Dr. Roberto José Sánchez Torres",
        "rsanchez@universidad.edu",
        "Inteligencia Artificial y Tecnologías Emergentes",
        "Machine Learning y Cloud Computing",
    ),
];

// Each professor teaches exactly 2 subjects.
const OFFERINGS: &[(&str, &str, &str, i64)] = &[
    ("MAT101", "PROF001", "Lunes y Miércoles 8:00-10:00 AM", 30),
    ("ALG101", "PROF001", "Martes y Jueves 8:00-10:00 AM", 30),
    ("PROG101", "PROF002", "Lunes y Miércoles 10:00 AM-12:00 PM", 35),
    ("WEB101", "PROF002", "Martes y Jueves 10:00 AM-12:00 PM", 35),
    ("DB101", "PROF003", "Lunes y Miércoles 2:00-4:00 PM", 30),
    ("CLOUD101", "PROF003", "Martes y Jueves 2:00-4:00 PM", 25),
    ("NET101", "PROF004", "Lunes y Miércoles 4:00-6:00 PM", 30),
    ("SEC101", "PROF004", "Martes y Jueves 4:00-6:00 PM", 25),
    ("AI101", "PROF005", "Lunes y Miércoles 6:00-8:00 PM", 25),
    ("MOB101", "PROF005", "Martes y Jueves 6:00-8:00 PM", 30),
];

impl Database {
    /// Loads the demo catalog if the database has none yet.
    pub fn seed_catalog(&self) -> ServiceResult<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");

        let existing: i64 =
            conn.query_row("SELECT COUNT(*) FROM credit_programs", [], |row| row.get(0))?;
        if existing > 0 {
            tracing::debug!("Catalog already seeded, skipping");
            return Ok(());
        }

        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        for (code, name, description, total_credits) in CREDIT_PROGRAMS {
            tx.execute(
                "INSERT INTO credit_programs (id, code, name, description, total_credits_required, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    Uuid::new_v4().to_string(),
                    code,
                    name,
                    description,
                    total_credits,
                    &now,
                ),
            )?;
        }

        let mut subject_ids: HashMap<&str, String> = HashMap::new();
        for (code, name, description) in SUBJECTS {
            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO subjects (id, code, name, description, credits, created_at)
                 VALUES (?, ?, ?, ?, 3, ?)",
                (&id, code, name, description, &now),
            )?;
            subject_ids.insert(code, id);
        }

        let mut professor_ids: HashMap<&str, String> = HashMap::new();
        for (code, full_name, email, department, specialization) in PROFESSORS {
            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO professors (id, employee_code, full_name, email, department, specialization, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (&id, code, full_name, email, department, specialization, &now),
            )?;
            professor_ids.insert(code, id);
        }

        for (subject_code, professor_code, schedule, capacity) in OFFERINGS {
            tx.execute(
                "INSERT INTO class_offerings (id, subject_id, professor_id, offering_code,
                                              academic_period, schedule, max_capacity, is_active, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)",
                (
                    Uuid::new_v4().to_string(),
                    &subject_ids[subject_code],
                    &professor_ids[professor_code],
                    format!("{}-{}-{}", subject_code, professor_code, ACADEMIC_PERIOD),
                    ACADEMIC_PERIOD,
                    schedule,
                    capacity,
                    &now,
                ),
            )?;
        }

        tx.commit()?;
        tracing::info!(
            "Seeded catalog: {} credit programs, {} subjects, {} professors, {} offerings",
            CREDIT_PROGRAMS.len(),
            SUBJECTS.len(),
            PROFESSORS.len(),
            OFFERINGS.len()
        );

        Ok(())
    }
}
