mod db;
mod env_config;
mod error;
mod logger;
mod services;

use db::clickhouse::clickhouse_service::ClickhouseService;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use services::fetch::dispatcher::BoundedDispatcher;
use services::fetch::extractor::MoexPageExtractor;
use services::fetch::session::FetchSession;
use services::fetch::symbols;
use services::loader::batch_loader::BatchLoader;
use services::staging::writer::SinkWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Инициализация настроек и логирования
    let settings: Arc<AppSettings> = Arc::new(initialize_application());

    // Этап конвейера: сбор котировок или загрузка в хранилище
    let stage = std::env::args().nth(1).unwrap_or_else(|| "fetch".to_string());

    match stage.as_str() {
        "fetch" => run_fetch_stage(settings).await,
        "load" => run_load_stage(settings).await,
        other => {
            error!("Unknown stage {:?}, expected \"fetch\" or \"load\"", other);
            std::process::exit(2);
        }
    }
}

/// Инициализирует настройки и логирование приложения
fn initialize_application() -> AppSettings {
    // Загрузка переменных окружения и конфигурации
    let environment = AppEnv::new();
    let config = AppConfig::new(&environment.env);
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        app_settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting MOEX snapshots pipeline...");
    info!("Current environment: {}", app_settings.app_env.env);

    if app_settings.app_env.is_local() {
        debug!("Configuration details: {:#?}", app_settings);
    }

    app_settings
}

/// Этап сбора: тикеры -> извлечение с ограничением параллелизма ->
/// промежуточные JSONL-файлы
async fn run_fetch_stage(settings: Arc<AppSettings>) {
    let staging = &settings.app_config.staging;
    let fetcher = &settings.app_config.fetcher;

    // Пустой или отсутствующий список тикеров — пустой результат, не сбой
    let tickers = match symbols::load_symbols(Path::new(&staging.symbols_file)) {
        Ok(tickers) => tickers,
        Err(e) => {
            error!("Cannot read ticker list {}: {}", staging.symbols_file, e);
            info!("0 of 0 tickers processed successfully");
            return;
        }
    };

    let session = match FetchSession::open(fetcher) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to open fetch session: {}", e);
            info!("0 of {} tickers processed successfully", tickers.len());
            return;
        }
    };

    let extractor = MoexPageExtractor::new(&fetcher.base_url);
    let dispatcher = BoundedDispatcher::new(extractor, fetcher.concurrency_limit);

    let report = dispatcher.run(session, &tickers).await;

    let written = match SinkWriter::new(Path::new(&staging.dir)) {
        Ok(writer) => writer.append_all(&report.snapshots),
        Err(e) => {
            error!("Cannot open staging directory {}: {}", staging.dir, e);
            0
        }
    };

    info!(
        "{} of {} tickers processed successfully",
        written, report.total
    );
}

/// Этап загрузки: промежуточные JSONL-файлы -> таблицы ClickHouse
async fn run_load_stage(settings: Arc<AppSettings>) {
    let clickhouse_service = match ClickhouseService::new(&settings).await {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to connect to ClickHouse: {}", e);
            std::process::exit(1);
        }
    };

    let loader = BatchLoader::new(
        clickhouse_service.repository_snapshot.clone(),
        Path::new(&settings.app_config.staging.dir),
        settings.app_config.clickhouse.batch_size,
    );

    let loaded = loader.load_all().await;
    info!("Load stage finished: {} tickers loaded", loaded);
}
