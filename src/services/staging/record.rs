use crate::services::fetch::snapshot::Snapshot;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Строка промежуточного JSONL-файла, 1:1 со срезом.
///
/// Имена полей зафиксированы форматом хранилища: `code, Date, Time, Open,
/// Max, Min, Close, Volume`, числовые поля допускают null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagedRecord {
    pub code: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "Max")]
    pub max: Option<f64>,
    #[serde(rename = "Min")]
    pub min: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,
}

impl From<&Snapshot> for StagedRecord {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            code: snapshot.symbol.clone(),
            date: snapshot.date.format(DATE_FORMAT).to_string(),
            time: snapshot.time.format(TIME_FORMAT).to_string(),
            open: snapshot.open,
            max: snapshot.high,
            min: snapshot.low,
            close: snapshot.close,
            volume: snapshot.volume,
        }
    }
}

impl StagedRecord {
    /// Разбирает дату и время записи в единый timestamp для хранилища
    pub fn parse_timestamp(&self) -> Option<(NaiveDate, NaiveDateTime)> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(&self.time, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&self.time, "%H:%M:%S"))
            .ok()?;
        Some((date, date.and_time(time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            symbol: "SBER".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            open: Some(274.5),
            high: None,
            low: Some(273.9),
            close: Some(274.8),
            volume: Some(1_234_567.89),
        }
    }

    #[test]
    fn test_record_field_names_match_staging_format() {
        let record = StagedRecord::from(&snapshot());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["code"], "SBER");
        assert_eq!(json["Date"], "2024-01-10");
        assert_eq!(json["Time"], "10:30");
        assert_eq!(json["Open"], 274.5);
        assert!(json["Max"].is_null());
        assert_eq!(json["Min"], 273.9);
        assert_eq!(json["Close"], 274.8);
        assert_eq!(json["Volume"], 1_234_567.89);
    }

    #[test]
    fn test_parse_timestamp_combines_date_and_time() {
        let record = StagedRecord::from(&snapshot());
        let (date, timestamp) = record.parse_timestamp().unwrap();

        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(
            timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let mut record = StagedRecord::from(&snapshot());
        record.time = "sometime".to_string();
        assert!(record.parse_timestamp().is_none());
    }

    #[test]
    fn test_round_trip_with_nulls() {
        let record = StagedRecord {
            code: "GAZP".to_string(),
            date: "2024-01-10".to_string(),
            time: "10:30".to_string(),
            open: None,
            max: None,
            min: None,
            close: None,
            volume: None,
        };

        let line = serde_json::to_string(&record).unwrap();
        let parsed: StagedRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
    }
}
