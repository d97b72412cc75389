mod handlers;
pub mod middleware;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub use middleware::AuthConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthConfig,
}

pub fn create_router(db: Database, auth: AuthConfig) -> Router {
    let state = AppState { db, auth };

    let public = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/health", get(handlers::health));

    let protected = Router::new()
        // Students
        .route("/students", get(handlers::list_students))
        .route("/students/me", get(handlers::get_my_profile))
        .route("/students/{id}", get(handlers::get_student))
        .route("/students/{id}", put(handlers::update_student))
        // Catalog
        .route("/class-offerings", get(handlers::list_class_offerings))
        // Enrollments
        .route("/enrollments", post(handlers::create_enrollment))
        .route("/enrollments/my", get(handlers::list_my_enrollments))
        .route(
            "/enrollments/my/details",
            get(handlers::list_my_enrollments_with_classmates),
        )
        .route("/enrollments/{id}", delete(handlers::drop_enrollment))
        .route("/enrollments/{id}/classmates", get(handlers::list_classmates))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
