use super::record::StagedRecord;
use crate::error::Result;
use crate::services::fetch::snapshot::Snapshot;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Пишет срезы в промежуточные JSONL-файлы, по файлу на тикер.
///
/// Файл открывается только на дозапись: данные прошлых прогонов никогда
/// не перезатираются. Дедупликации нет — повторная запись того же среза
/// дает вторую строку.
pub struct SinkWriter {
    dir: PathBuf,
}

impl SinkWriter {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn staging_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", symbol))
    }

    /// Дописывает один срез в файл его тикера
    pub fn append(&self, snapshot: &Snapshot) -> Result<()> {
        let record = StagedRecord::from(snapshot);
        let line = serde_json::to_string(&record)?;
        let path = self.staging_path(&snapshot.symbol);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", line)?;

        debug!("{}: staged record appended to {}", snapshot.symbol, path.display());
        Ok(())
    }

    /// Пишет пачку срезов; сбой записи одного тикера логируется
    /// и не мешает записать остальные. Возвращает число записанных.
    pub fn append_all(&self, snapshots: &[Snapshot]) -> usize {
        let mut written = 0;

        for snapshot in snapshots {
            match self.append(snapshot) {
                Ok(()) => written += 1,
                Err(e) => error!("{}: failed to stage snapshot: {}", snapshot.symbol, e),
            }
        }

        info!("Staged {} of {} snapshots", written, snapshots.len());
        written
    }
}
