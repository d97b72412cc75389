use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use matricula::api::{create_router, AuthConfig};
use matricula::db::Database;
use matricula::models::*;

fn setup() -> (TestServer, Database) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db.seed_catalog().expect("Failed to seed catalog");
    let app = create_router(db.clone(), AuthConfig::with_secret("test-secret"));
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, db)
}

fn register_input(db: &Database, username: &str, number: &str) -> RegisterInput {
    let programs = db.get_credit_programs().expect("Query failed");
    let program = &programs[0];
    RegisterInput {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "Secreto1".to_string(),
        confirm_password: "Secreto1".to_string(),
        first_name: "María".to_string(),
        last_name: "García".to_string(),
        student_number: number.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2000, 5, 14).unwrap(),
        phone_number: "555-0101".to_string(),
        address: "Calle Falsa 123".to_string(),
        credit_program_id: program.id,
    }
}

async fn register(server: &TestServer, db: &Database, username: &str, number: &str) -> AuthResponse {
    let response = server
        .post("/api/v1/auth/register")
        .json(&register_input(db, username, number))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<AuthResponse>()
}

async fn register_named(
    server: &TestServer,
    db: &Database,
    username: &str,
    number: &str,
    first: &str,
    last: &str,
) -> AuthResponse {
    let mut input = register_input(db, username, number);
    input.first_name = first.to_string();
    input.last_name = last.to_string();
    let response = server.post("/api/v1/auth/register").json(&input).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<AuthResponse>()
}

fn bearer(auth: &AuthResponse) -> String {
    format!("Bearer {}", auth.token)
}

/// Active offerings taught by pairwise-distinct professors, in catalog order.
fn distinct_professor_offerings(db: &Database) -> Vec<ClassOfferingSummary> {
    let mut seen = std::collections::HashSet::new();
    db.get_available_class_offerings()
        .expect("Query failed")
        .into_iter()
        .filter(|o| seen.insert(o.professor_full_name.clone()))
        .collect()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn returns_ok_without_auth() {
        let (server, _db) = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn register_returns_token_and_student_info() {
        let (server, db) = setup();

        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        assert_eq!(auth.token_type, "Bearer");
        assert!(!auth.token.is_empty());
        assert_eq!(auth.username, "mgarcia");
        assert_eq!(auth.role, Role::Student);
        assert_eq!(auth.student_full_name, Some("María García".to_string()));
        assert_eq!(auth.student_number, Some("A2025001".to_string()));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let (server, db) = setup();
        register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .post("/api/v1/auth/register")
            .json(&register_input(&db, "mgarcia", "A2025002"))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.text().contains("ya está en uso"));
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let (server, db) = setup();

        let mut input = register_input(&db, "mgarcia", "A2025001");
        input.password = "secreto1".to_string();
        input.confirm_password = "secreto1".to_string();

        let response = server.post("/api/v1/auth/register").json(&input).await;

        response.assert_status_bad_request();
        assert!(response.text().contains("mayúscula"));
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let (server, db) = setup();
        register(&server, &db, "mgarcia", "A2025001").await;

        let by_username = server
            .post("/api/v1/auth/login")
            .json(&LoginInput {
                username_or_email: "mgarcia".to_string(),
                password: "Secreto1".to_string(),
            })
            .await;
        by_username.assert_status_ok();

        let by_email = server
            .post("/api/v1/auth/login")
            .json(&LoginInput {
                username_or_email: "mgarcia@example.com".to_string(),
                password: "Secreto1".to_string(),
            })
            .await;
        by_email.assert_status_ok();
        let auth: AuthResponse = by_email.json();
        assert_eq!(auth.username, "mgarcia");
        assert!(auth.student_id.is_some());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let (server, db) = setup();
        register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&LoginInput {
                username_or_email: "mgarcia".to_string(),
                password: "Equivocada1".to_string(),
            })
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_rejects_unknown_account() {
        let (server, _db) = setup();

        let response = server
            .post("/api/v1/auth/login")
            .json(&LoginInput {
                username_or_email: "nadie".to_string(),
                password: "Secreto1".to_string(),
            })
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn protected_endpoint_requires_token() {
        let (server, _db) = setup();

        let response = server.get("/api/v1/students/me").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_garbage_tokens() {
        let (server, _db) = setup();

        let response = server
            .get("/api/v1/students/me")
            .add_header("Authorization", "Bearer not-a-token")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_non_bearer_schemes() {
        let (server, _db) = setup();

        let response = server
            .get("/api/v1/students/me")
            .add_header("Authorization", "Basic dXNlcjpwYXNz")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_issued_tokens() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .get("/api/v1/students/me")
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_ok();
    }
}

mod students {
    use super::*;

    #[tokio::test]
    async fn me_returns_the_profile() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .get("/api/v1/students/me")
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_ok();
        let profile: StudentProfile = response.json();
        assert_eq!(profile.username, "mgarcia");
        assert_eq!(profile.full_name, "María García");
        assert!(!profile.credit_program_code.is_empty());
    }

    #[tokio::test]
    async fn lists_registered_students() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        register(&server, &db, "jlopez", "A2025002").await;

        let response = server
            .get("/api/v1/students")
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_ok();
        let students: Vec<Student> = response.json();
        assert_eq!(students.len(), 2);
    }

    #[tokio::test]
    async fn get_returns_not_found_for_unknown_student() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .get(&format!("/api/v1/students/{}", uuid::Uuid::new_v4()))
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn owner_can_update_their_profile() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let student_id = auth.student_id.unwrap();

        let response = server
            .put(&format!("/api/v1/students/{}", student_id))
            .add_header("Authorization", bearer(&auth))
            .json(&UpdateStudentInput {
                first_name: "María José".to_string(),
                last_name: "García".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2000, 5, 14).unwrap(),
                phone_number: "555-0202".to_string(),
                address: "Avenida Siempre Viva 742".to_string(),
            })
            .await;

        response.assert_status_ok();
        let profile: StudentProfile = response.json();
        assert_eq!(profile.first_name, "María José");
        assert_eq!(profile.phone_number, "555-0202");
    }

    #[tokio::test]
    async fn updating_another_students_profile_is_forbidden() {
        let (server, db) = setup();
        let owner = register(&server, &db, "mgarcia", "A2025001").await;
        let intruder = register(&server, &db, "jlopez", "A2025002").await;

        let response = server
            .put(&format!("/api/v1/students/{}", owner.student_id.unwrap()))
            .add_header("Authorization", bearer(&intruder))
            .json(&UpdateStudentInput {
                first_name: "Hackeada".to_string(),
                last_name: "García".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2000, 5, 14).unwrap(),
                phone_number: "555-0101".to_string(),
                address: "Calle Falsa 123".to_string(),
            })
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn update_rejects_blank_names() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .put(&format!("/api/v1/students/{}", auth.student_id.unwrap()))
            .add_header("Authorization", bearer(&auth))
            .json(&UpdateStudentInput {
                first_name: "  ".to_string(),
                last_name: "García".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2000, 5, 14).unwrap(),
                phone_number: "555-0101".to_string(),
                address: "Calle Falsa 123".to_string(),
            })
            .await;

        response.assert_status_bad_request();
    }
}

mod class_offerings {
    use super::*;

    #[tokio::test]
    async fn lists_the_seeded_catalog_ordered_by_subject() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .get("/api/v1/class-offerings")
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_ok();
        let offerings: Vec<ClassOfferingSummary> = response.json();
        assert_eq!(offerings.len(), 10);
        assert_eq!(offerings[0].subject_name, "Algoritmos y Estructuras de Datos");
        assert!(offerings.iter().all(|o| o.has_available_spots));
    }

    #[tokio::test]
    async fn reflects_enrollment_counts() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let target = db.get_available_class_offerings().expect("Query failed")[0].id;

        server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: target,
                notes: None,
            })
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/class-offerings")
            .add_header("Authorization", bearer(&auth))
            .await;

        let offerings: Vec<ClassOfferingSummary> = response.json();
        let enrolled = offerings.iter().find(|o| o.id == target).unwrap();
        assert_eq!(enrolled.current_enrollment_count, 1);
    }
}

mod enrollments {
    use super::*;

    #[tokio::test]
    async fn create_returns_the_detail_projection() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let offerings = db.get_available_class_offerings().expect("Query failed");
        let offering = &offerings[0];

        let response = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering.id,
                notes: Some("Primera inscripción".to_string()),
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let details: EnrollmentDetails = response.json();
        assert_eq!(details.status, EnrollmentStatus::Active);
        assert_eq!(details.student_id, auth.student_id.unwrap());
        assert_eq!(details.subject_name, offering.subject_name);
        assert_eq!(details.professor_full_name, offering.professor_full_name);
        assert_eq!(details.notes, Some("Primera inscripción".to_string()));
    }

    #[tokio::test]
    async fn create_rejects_unknown_offerings() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: uuid::Uuid::new_v4(),
                notes: None,
            })
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn create_rejects_double_enrollment() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = server
                .post("/api/v1/enrollments")
                .add_header("Authorization", bearer(&auth))
                .json(&CreateEnrollmentInput {
                    class_offering_id: offering_id,
                    notes: None,
                })
                .await;
            response.assert_status(expected);
        }
    }

    #[tokio::test]
    async fn enforces_the_active_cap() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let offerings = distinct_professor_offerings(&db);

        for offering in &offerings[..3] {
            server
                .post("/api/v1/enrollments")
                .add_header("Authorization", bearer(&auth))
                .json(&CreateEnrollmentInput {
                    class_offering_id: offering.id,
                    notes: None,
                })
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offerings[3].id,
                notes: None,
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.text().contains("límite máximo"));
    }

    #[tokio::test]
    async fn rejects_two_offerings_of_the_same_professor() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        // The seeded catalog has every professor teaching two subjects.
        let offerings = db.get_available_class_offerings().expect("Query failed");
        let first = &offerings[0];
        let second = offerings
            .iter()
            .find(|o| o.id != first.id && o.professor_full_name == first.professor_full_name)
            .expect("Seeded professor should teach two subjects");

        server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: first.id,
                notes: None,
            })
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: second.id,
                notes: None,
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.text().contains("profesores diferentes"));
    }

    #[tokio::test]
    async fn enforces_offering_capacity() {
        let (server, db) = setup();

        let subject = db
            .create_subject(CreateSubjectInput {
                code: "TEST101".to_string(),
                name: "Materia de Prueba".to_string(),
                description: "Curso de prueba".to_string(),
                credits: 3,
            })
            .expect("Failed to create subject");
        let professor = db
            .create_professor(CreateProfessorInput {
                employee_code: "PROF900".to_string(),
                full_name: "Dr. Externo Prueba".to_string(),
                email: "prueba@universidad.edu".to_string(),
                department: "Pruebas".to_string(),
                specialization: "Pruebas".to_string(),
            })
            .expect("Failed to create professor");
        let offering = db
            .create_class_offering(CreateClassOfferingInput {
                subject_id: subject.id,
                professor_id: professor.id,
                offering_code: "TEST101-PROF900-2025-1".to_string(),
                academic_period: "2025-1".to_string(),
                schedule: "Sábados 8:00-10:00 AM".to_string(),
                max_capacity: Some(2),
            })
            .expect("Failed to create offering");

        for (username, number) in [("mgarcia", "A2025001"), ("jlopez", "A2025002")] {
            let auth = register(&server, &db, username, number).await;
            server
                .post("/api/v1/enrollments")
                .add_header("Authorization", bearer(&auth))
                .json(&CreateEnrollmentInput {
                    class_offering_id: offering.id,
                    notes: None,
                })
                .await
                .assert_status(StatusCode::CREATED);
        }

        let third = register(&server, &db, "aperez", "A2025003").await;
        let response = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&third))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering.id,
                notes: None,
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.text().contains("capacidad máxima"));
    }

    #[tokio::test]
    async fn drop_then_reenroll_reuses_the_row() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        let created: EnrollmentDetails = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await
            .json();

        let dropped = server
            .delete(&format!("/api/v1/enrollments/{}", created.id))
            .add_header("Authorization", bearer(&auth))
            .await;
        dropped.assert_status_ok();
        let dropped: EnrollmentDetails = dropped.json();
        assert_eq!(dropped.status, EnrollmentStatus::Dropped);

        let reenrolled = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await;
        reenrolled.assert_status(StatusCode::CREATED);
        let reenrolled: EnrollmentDetails = reenrolled.json();
        assert_eq!(reenrolled.id, created.id);
        assert_eq!(reenrolled.status, EnrollmentStatus::Active);
    }

    #[tokio::test]
    async fn drop_rejects_a_second_attempt() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        let created: EnrollmentDetails = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await
            .json();

        server
            .delete(&format!("/api/v1/enrollments/{}", created.id))
            .add_header("Authorization", bearer(&auth))
            .await
            .assert_status_ok();

        let response = server
            .delete(&format!("/api/v1/enrollments/{}", created.id))
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.text().contains("ya fue cancelada"));
    }

    #[tokio::test]
    async fn drop_returns_not_found_for_unknown_enrollment() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;

        let response = server
            .delete(&format!("/api/v1/enrollments/{}", uuid::Uuid::new_v4()))
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn dropping_another_students_enrollment_is_forbidden() {
        let (server, db) = setup();
        let owner = register(&server, &db, "mgarcia", "A2025001").await;
        let intruder = register(&server, &db, "jlopez", "A2025002").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        let created: EnrollmentDetails = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&owner))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await
            .json();

        let response = server
            .delete(&format!("/api/v1/enrollments/{}", created.id))
            .add_header("Authorization", bearer(&intruder))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn my_enrollments_lists_every_status() {
        let (server, db) = setup();
        let auth = register(&server, &db, "mgarcia", "A2025001").await;
        let offerings = distinct_professor_offerings(&db);

        let first: EnrollmentDetails = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offerings[0].id,
                notes: None,
            })
            .await
            .json();
        server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&auth))
            .json(&CreateEnrollmentInput {
                class_offering_id: offerings[1].id,
                notes: None,
            })
            .await
            .assert_status(StatusCode::CREATED);
        server
            .delete(&format!("/api/v1/enrollments/{}", first.id))
            .add_header("Authorization", bearer(&auth))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/v1/enrollments/my")
            .add_header("Authorization", bearer(&auth))
            .await;

        response.assert_status_ok();
        let enrollments: Vec<EnrollmentDetails> = response.json();
        assert_eq!(enrollments.len(), 2);
        assert!(enrollments.iter().any(|e| e.status == EnrollmentStatus::Dropped));
        assert!(enrollments.iter().any(|e| e.status == EnrollmentStatus::Active));
    }
}

mod classmates {
    use super::*;

    #[tokio::test]
    async fn lists_co_enrolled_students() {
        let (server, db) = setup();
        let me = register(&server, &db, "mgarcia", "A2025001").await;
        let other = register(&server, &db, "jlopez", "A2025002").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        let mine: EnrollmentDetails = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&me))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await
            .json();
        server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&other))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/enrollments/{}/classmates", mine.id))
            .add_header("Authorization", bearer(&me))
            .await;

        response.assert_status_ok();
        let classmates: Vec<EnrollmentDetails> = response.json();
        assert_eq!(classmates.len(), 1);
        assert_eq!(classmates[0].student_id, other.student_id.unwrap());
    }

    #[tokio::test]
    async fn viewing_another_students_classmates_is_forbidden() {
        let (server, db) = setup();
        let owner = register(&server, &db, "mgarcia", "A2025001").await;
        let intruder = register(&server, &db, "jlopez", "A2025002").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        let created: EnrollmentDetails = server
            .post("/api/v1/enrollments")
            .add_header("Authorization", bearer(&owner))
            .json(&CreateEnrollmentInput {
                class_offering_id: offering_id,
                notes: None,
            })
            .await
            .json();

        let response = server
            .get(&format!("/api/v1/enrollments/{}/classmates", created.id))
            .add_header("Authorization", bearer(&intruder))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn details_view_carries_classmate_names() {
        let (server, db) = setup();
        let me = register(&server, &db, "mgarcia", "A2025001").await;
        let other = register_named(&server, &db, "jlopez", "A2025002", "Juan", "López").await;
        let offering_id = db.get_available_class_offerings().expect("Query failed")[0].id;

        for auth in [&me, &other] {
            server
                .post("/api/v1/enrollments")
                .add_header("Authorization", bearer(auth))
                .json(&CreateEnrollmentInput {
                    class_offering_id: offering_id,
                    notes: None,
                })
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/api/v1/enrollments/my/details")
            .add_header("Authorization", bearer(&me))
            .await;

        response.assert_status_ok();
        let entries: Vec<EnrollmentWithClassmates> = response.json();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].classmates, vec!["Juan López".to_string()]);
    }
}
