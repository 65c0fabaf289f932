use crate::db::clickhouse::connection::ClickhouseConnection;
use crate::db::clickhouse::repository::snapshot_repository::{
    ClickhouseSnapshotRepository, SnapshotRepository,
};
use crate::env_config::models::app_setting::AppSettings;
use crate::error::Result;
use std::sync::Arc;
use tracing::{error, info};

pub struct ClickhouseService {
    pub repository_snapshot: Arc<dyn SnapshotRepository>,
}

impl ClickhouseService {
    pub async fn new(settings: &Arc<AppSettings>) -> Result<Self> {
        info!("Initializing warehouse service components");

        let connection = match ClickhouseConnection::new(settings.clone()).await {
            Ok(conn) => {
                info!("ClickHouse connection established successfully");
                Arc::new(conn)
            }
            Err(e) => {
                error!("Failed to establish ClickHouse connection: {}", e);
                return Err(e.into());
            }
        };

        let repository_snapshot: Arc<dyn SnapshotRepository> =
            Arc::new(ClickhouseSnapshotRepository::new(connection));

        info!("Warehouse service initialized successfully");

        Ok(Self { repository_snapshot })
    }
}
