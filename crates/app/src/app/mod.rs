use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::services::AppServices;
use upkeep_db::Db;

/// Loaded configuration plus the services built from it.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    /// Opens the database and applies pending migrations. Failing to open is a
    /// configuration problem; failing to migrate is a persistence one.
    pub fn open_db(&self) -> Result<Db> {
        let path = &self.config.database.path;
        let mut db = Db::open(path).map_err(|err| {
            AppError::Config(format!("open database {}: {}", path.display(), err))
        })?;
        db.migrate()?;
        Ok(db)
    }
}
