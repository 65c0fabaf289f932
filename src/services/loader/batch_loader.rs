use crate::db::clickhouse::models::snapshot_row::DbSnapshotRow;
use crate::db::clickhouse::repository::snapshot_repository::SnapshotRepository;
use crate::error::Result;
use crate::services::fetch::symbols::is_valid_symbol;
use crate::services::staging::record::StagedRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Итог загрузки одного промежуточного файла
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    pub inserted: u64,
    pub batches: usize,
    pub skipped: usize,
}

/// Переносит записи из промежуточных JSONL-файлов в хранилище.
///
/// Для каждого тикера: создает таблицу при отсутствии, читает файл построчно,
/// копит строки в пачки фиксированного размера, вставляет каждую полную пачку
/// и в конце остаток. Неразборчивая строка пропускается с предупреждением
/// и попадает в счетчик `skipped`.
pub struct BatchLoader {
    repository: Arc<dyn SnapshotRepository>,
    staging_dir: PathBuf,
    batch_size: usize,
}

impl BatchLoader {
    pub fn new(repository: Arc<dyn SnapshotRepository>, staging_dir: &Path, batch_size: usize) -> Self {
        Self {
            repository,
            staging_dir: staging_dir.to_path_buf(),
            batch_size: batch_size.max(1),
        }
    }

    /// Загружает промежуточный файл одного тикера в его таблицу
    pub async fn load_symbol(&self, symbol: &str) -> Result<LoadReport> {
        let path = self.staging_dir.join(format!("{}.jsonl", symbol));
        info!("Loading staged records for {} from {}", symbol, path.display());

        self.repository.ensure_table(symbol).await?;

        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut report = LoadReport::default();
        let mut batch: Vec<DbSnapshotRow> = Vec::with_capacity(self.batch_size);

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let row = match parse_line(&line) {
                Some(row) => row,
                None => {
                    warn!(
                        "{}: skipping malformed staged record at line {}",
                        symbol,
                        line_number + 1
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            batch.push(row);

            if batch.len() >= self.batch_size {
                report.inserted += self.repository.insert_rows(symbol, &batch).await?;
                report.batches += 1;
                batch.clear();
            }
        }

        // Остаток меньше полной пачки вставляется отдельно
        if !batch.is_empty() {
            report.inserted += self.repository.insert_rows(symbol, &batch).await?;
            report.batches += 1;
        }

        info!(
            "{}: loaded {} rows in {} batches, {} malformed lines skipped",
            symbol, report.inserted, report.batches, report.skipped
        );

        Ok(report)
    }

    /// Загружает все промежуточные файлы каталога; ошибка по одному тикеру
    /// логируется и не мешает загрузке остальных. Возвращает число
    /// успешно загруженных тикеров.
    pub async fn load_all(&self) -> usize {
        let symbols = self.staged_symbols();

        if symbols.is_empty() {
            warn!(
                "No staged files found in {}, nothing to load",
                self.staging_dir.display()
            );
            return 0;
        }

        let mut loaded = 0;
        for symbol in &symbols {
            match self.load_symbol(symbol).await {
                Ok(_) => loaded += 1,
                Err(e) => error!("{}: load failed: {}", symbol, e),
            }
        }

        info!("Warehouse load complete: {} of {} tickers", loaded, symbols.len());
        loaded
    }

    // SBER.jsonl -> SBER; имя файла становится именем таблицы,
    // поэтому посторонние имена отбрасываются с предупреждением
    fn staged_symbols(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.staging_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    "Cannot read staging directory {}: {}",
                    self.staging_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut symbols = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if is_valid_symbol(stem) {
                        symbols.push(stem.to_string());
                    } else {
                        warn!("Skipping staged file with invalid ticker name: {:?}", stem);
                    }
                }
            }
        }
        symbols.sort();

        debug!("Found {} staged files", symbols.len());
        symbols
    }
}

fn parse_line(line: &str) -> Option<DbSnapshotRow> {
    let record: StagedRecord = serde_json::from_str(line).ok()?;
    DbSnapshotRow::from_record(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    /// Репозиторий-заглушка: запоминает размеры вставленных пачек
    #[derive(Default)]
    struct RecordingRepository {
        ensured: Mutex<Vec<String>>,
        batch_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl SnapshotRepository for RecordingRepository {
        async fn ensure_table(&self, symbol: &str) -> Result<()> {
            self.ensured.lock().unwrap().push(symbol.to_string());
            Ok(())
        }

        async fn insert_rows(&self, _symbol: &str, rows: &[DbSnapshotRow]) -> Result<u64> {
            self.batch_sizes.lock().unwrap().push(rows.len());
            Ok(rows.len() as u64)
        }
    }

    fn staged_line(minute: usize) -> String {
        format!(
            r#"{{"code":"SBER","Date":"2024-01-10","Time":"{:02}:{:02}","Open":274.5,"Max":275.1,"Min":273.9,"Close":274.8,"Volume":1000.0}}"#,
            (minute / 60) % 24,
            minute % 60
        )
    }

    fn write_staging_file(dir: &Path, symbol: &str, lines: &[String]) {
        let mut file = File::create(dir.join(format!("{}.jsonl", symbol))).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    fn loader(repo: Arc<RecordingRepository>, dir: &Path, batch_size: usize) -> BatchLoader {
        BatchLoader::new(repo, dir, batch_size)
    }

    #[tokio::test]
    async fn test_2500_records_give_three_batches() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..2500).map(staged_line).collect();
        write_staging_file(dir.path(), "SBER", &lines);

        let repo = Arc::new(RecordingRepository::default());
        let report = loader(repo.clone(), dir.path(), 1000)
            .load_symbol("SBER")
            .await
            .unwrap();

        assert_eq!(report.inserted, 2500);
        assert_eq!(report.batches, 3);
        assert_eq!(*repo.batch_sizes.lock().unwrap(), vec![1000, 1000, 500]);
    }

    #[tokio::test]
    async fn test_remainder_smaller_than_one_batch_still_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..5).map(staged_line).collect();
        write_staging_file(dir.path(), "SBER", &lines);

        let repo = Arc::new(RecordingRepository::default());
        let report = loader(repo.clone(), dir.path(), 1000)
            .load_symbol("SBER")
            .await
            .unwrap();

        assert_eq!(report.inserted, 5);
        assert_eq!(report.batches, 1);
        assert_eq!(*repo.batch_sizes.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_table_is_ensured_before_insert() {
        let dir = tempfile::tempdir().unwrap();
        write_staging_file(dir.path(), "GAZP", &[staged_line(0)]);

        let repo = Arc::new(RecordingRepository::default());
        loader(repo.clone(), dir.path(), 1000)
            .load_symbol("GAZP")
            .await
            .unwrap();

        assert_eq!(*repo.ensured.lock().unwrap(), vec!["GAZP"]);
    }

    #[tokio::test]
    async fn test_malformed_line_is_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let lines = vec![
            staged_line(0),
            "{not json at all".to_string(),
            staged_line(1),
        ];
        write_staging_file(dir.path(), "SBER", &lines);

        let repo = Arc::new(RecordingRepository::default());
        let report = loader(repo.clone(), dir.path(), 1000)
            .load_symbol("SBER")
            .await
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_missing_staging_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(RecordingRepository::default());

        let result = loader(repo, dir.path(), 1000).load_symbol("NONE").await;
        assert!(result.is_err());
    }

    /// Репозиторий, отказывающий одному тикеру на создании таблицы
    struct FailingRepository {
        fail_on: String,
        ensured: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SnapshotRepository for FailingRepository {
        async fn ensure_table(&self, symbol: &str) -> Result<()> {
            if symbol == self.fail_on {
                return Err(std::io::Error::other("connection refused").into());
            }
            self.ensured.lock().unwrap().push(symbol.to_string());
            Ok(())
        }

        async fn insert_rows(&self, _symbol: &str, rows: &[DbSnapshotRow]) -> Result<u64> {
            Ok(rows.len() as u64)
        }
    }

    #[tokio::test]
    async fn test_non_identifier_file_stem_never_reaches_repository() {
        let dir = tempfile::tempdir().unwrap();
        write_staging_file(dir.path(), "SBER", &[staged_line(0)]);
        // Постороннее имя файла не должно дойти до SQL
        write_staging_file(dir.path(), "EVIL, (SELECT 1)", &[staged_line(1)]);

        let repo = Arc::new(RecordingRepository::default());
        let loaded = loader(repo.clone(), dir.path(), 1000).load_all().await;

        assert_eq!(loaded, 1);
        assert_eq!(*repo.ensured.lock().unwrap(), vec!["SBER"]);
    }

    #[tokio::test]
    async fn test_one_failing_symbol_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        write_staging_file(dir.path(), "SBER", &[staged_line(0)]);
        write_staging_file(dir.path(), "GAZP", &[staged_line(1)]);
        write_staging_file(dir.path(), "LKOH", &[staged_line(2)]);

        let repo = Arc::new(FailingRepository {
            fail_on: "GAZP".to_string(),
            ensured: Mutex::new(Vec::new()),
        });
        let loaded = BatchLoader::new(repo.clone(), dir.path(), 1000)
            .load_all()
            .await;

        assert_eq!(loaded, 2);
        let mut ensured = repo.ensured.lock().unwrap().clone();
        ensured.sort();
        assert_eq!(ensured, vec!["LKOH", "SBER"]);
    }

    #[tokio::test]
    async fn test_load_all_discovers_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        write_staging_file(dir.path(), "SBER", &[staged_line(0)]);
        write_staging_file(dir.path(), "GAZP", &[staged_line(1)]);

        let repo = Arc::new(RecordingRepository::default());
        let loaded = loader(repo.clone(), dir.path(), 1000).load_all().await;

        assert_eq!(loaded, 2);
        let mut ensured = repo.ensured.lock().unwrap().clone();
        ensured.sort();
        assert_eq!(ensured, vec!["GAZP", "SBER"]);
    }
}
