use crate::db::clickhouse::connection::ClickhouseConnection;
use crate::db::clickhouse::models::snapshot_row::DbSnapshotRow;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Доступ к таблицам срезов в хранилище: по таблице на тикер
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Создает таблицу тикера, если ее еще нет (идемпотентно)
    async fn ensure_table(&self, symbol: &str) -> Result<()>;

    /// Вставляет пачку строк в таблицу тикера
    async fn insert_rows(&self, symbol: &str, rows: &[DbSnapshotRow]) -> Result<u64>;
}

pub struct ClickhouseSnapshotRepository {
    connection: Arc<ClickhouseConnection>,
}

impl ClickhouseSnapshotRepository {
    pub fn new(connection: Arc<ClickhouseConnection>) -> Self {
        Self { connection }
    }

    fn table_name(&self, symbol: &str) -> String {
        format!("{}.{}", self.connection.database(), symbol)
    }
}

#[async_trait]
impl SnapshotRepository for ClickhouseSnapshotRepository {
    async fn ensure_table(&self, symbol: &str) -> Result<()> {
        let client = self.connection.get_client();

        // Ценовые колонки Nullable: запись без части полей — валидный срез
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {}
            (
                date Date,
                time DateTime,
                open Nullable(Float32),
                high Nullable(Float32),
                low Nullable(Float32),
                close Nullable(Float32),
                volume Nullable(Float64)
            )
            ENGINE = MergeTree()
            ORDER BY (date, time)",
            self.table_name(symbol)
        );

        debug!("Ensuring warehouse table for {}", symbol);
        client.query(&ddl).execute().await?;

        Ok(())
    }

    async fn insert_rows(&self, symbol: &str, rows: &[DbSnapshotRow]) -> Result<u64> {
        if rows.is_empty() {
            debug!("{}: no rows to insert", symbol);
            return Ok(0);
        }

        let client = self.connection.get_client();

        let mut values_parts = Vec::with_capacity(rows.len());
        for row in rows {
            values_parts.push(format!(
                "('{}', '{}', {}, {}, {}, {}, {})",
                row.date.format("%Y-%m-%d"),
                row.time.format("%Y-%m-%d %H:%M:%S"),
                format_float_safe(row.open),
                format_float_safe(row.high),
                format_float_safe(row.low),
                format_float_safe(row.close),
                format_float_safe(row.volume),
            ));
        }

        let sql = format!(
            "INSERT INTO {} (date, time, open, high, low, close, volume) VALUES {}",
            self.table_name(symbol),
            values_parts.join(",")
        );

        client.query(&sql).execute().await?;

        info!("{}: inserted batch of {} rows", symbol, rows.len());
        Ok(rows.len() as u64)
    }
}

// Форматирует число для вставки в SQL: None, NaN и Infinity дают NULL
fn format_float_safe(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => "NULL".to_string(),
    }
}
