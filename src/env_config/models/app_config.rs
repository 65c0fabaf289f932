use super::app_env::Env;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub fetcher: FetcherConfig,
    pub staging: StagingConfig,
    pub clickhouse: ClickhouseConfig,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

/// Параметры этапа сбора котировок
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Базовый URL страницы инструмента, тикер дописывается в конец
    pub base_url: String,
    /// Максимум одновременных запросов к бирже
    pub concurrency_limit: usize,
    pub navigation_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StagingConfig {
    /// Файл со списком тикеров, по одному на строку
    pub symbols_file: String,
    /// Каталог для промежуточных JSONL-файлов
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickhouseConfig {
    pub timeout: u64,
    pub batch_size: usize,
}

impl AppConfig {
    pub fn new(env: &Env) -> AppConfig {
        let path = format!("config/{}.toml", env);
        Self::from_file(Path::new(&path))
    }

    fn from_file(path: &Path) -> AppConfig {
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read config file {}: {}", path.display(), e));
        toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse config file {}: {}", path.display(), e))
    }
}
