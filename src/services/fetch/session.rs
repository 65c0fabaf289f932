use crate::env_config::models::app_config::FetcherConfig;
use crate::error::Result;
use std::time::Duration;
use tracing::{debug, info};

/// Общая сессия этапа сбора: один HTTP-клиент на весь прогон.
///
/// Сессия открывается один раз, разделяется между всеми параллельными
/// извлечениями (каждый запрос независим) и закрывается ровно один раз
/// после завершения всех задач — этим владеет диспетчер.
#[derive(Clone)]
pub struct FetchSession {
    client: reqwest::Client,
}

impl FetchSession {
    pub fn open(config: &FetcherConfig) -> Result<Self> {
        debug!(
            "Opening fetch session, navigation timeout {} ms",
            config.navigation_timeout_ms
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.navigation_timeout_ms))
            .build()?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Закрывает сессию. Вызывается диспетчером строго после барьера.
    pub fn close(self) {
        info!("Fetch session closed");
    }
}
