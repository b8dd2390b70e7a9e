//! Libroteca - School Library Borrowing Lifecycle Server
//!
//! A Rust implementation of a school library back office, providing a REST
//! JSON API for the borrowing/return/fine lifecycle and its surrounding
//! catalog, student, settings and statistics surfaces.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
