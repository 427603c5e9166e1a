use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::db;
use crate::storage::{LocalStorage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;
        let storage = Arc::new(LocalStorage::new(&config.upload_dir)) as Arc<dyn StorageClient>;
        Ok(Self {
            db,
            config,
            storage,
        })
    }
}
