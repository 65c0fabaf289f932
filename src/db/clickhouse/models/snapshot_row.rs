use crate::services::staging::record::StagedRecord;
use chrono::{NaiveDate, NaiveDateTime};

/// Строка таблицы хранилища: `time` — дата и время среза одним значением
#[derive(Debug, Clone, PartialEq)]
pub struct DbSnapshotRow {
    pub date: NaiveDate,
    pub time: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl DbSnapshotRow {
    /// Преобразует промежуточную запись в строку таблицы.
    /// None для записи с неразборчивой датой или временем.
    pub fn from_record(record: &StagedRecord) -> Option<Self> {
        let (date, time) = record.parse_timestamp()?;
        Some(Self {
            date,
            time,
            open: record.open,
            high: record.max,
            low: record.min,
            close: record.close,
            volume: record.volume,
        })
    }
}
