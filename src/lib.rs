//! Matricula: a student course-registration service.
//!
//! The interesting part lives in [`db::Database`]'s enrollment operations,
//! which gate every enrollment state change behind the registration business
//! rules (per-student cap, distinct professors, offering capacity). The rest
//! is catalog/profile data access and a thin axum API on top.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
