//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod settings;
pub mod stats;
pub mod students;

use crate::error::AppResult;
use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    repository: Repository,
    pub circulation: circulation::CirculationService,
    pub catalog: catalog::CatalogService,
    pub students: students::StudentsService,
    pub settings: settings::SettingsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            circulation: circulation::CirculationService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            students: students::StudentsService::new(repository.clone()),
            settings: settings::SettingsService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Readiness of the backing database
    pub async fn db_ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
