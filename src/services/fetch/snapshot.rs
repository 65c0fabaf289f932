use chrono::{NaiveDate, NaiveTime};

/// Минутный срез котировки одного инструмента.
///
/// Символ, дата и время обязательны: срез создается только после успешного
/// разбора даты и времени. Ценовые поля и объем независимо опциональны —
/// срез без единого числового значения все равно считается валидным
/// и попадает в хранилище.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Результат извлечения данных по одному тикеру.
///
/// Извлечение никогда не возвращает `Err` наружу: любой сбой выражается
/// вариантом этого перечисления и обрабатывается диспетчером локально.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Успешно разобранный срез
    Snapshot(Snapshot),
    /// Обязательный элемент страницы (тултип или дата) отсутствует
    NotFound(String),
    /// Превышен таймаут навигации
    Timeout,
    /// Любая другая ошибка запроса или разбора
    Error(String),
}

impl ExtractionOutcome {
    pub fn is_snapshot(&self) -> bool {
        matches!(self, ExtractionOutcome::Snapshot(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_with_all_null_prices_is_valid() {
        // Срез без единого ценового поля — валидный срез
        let snapshot = Snapshot {
            symbol: "SBER".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        };

        let outcome = ExtractionOutcome::Snapshot(snapshot);
        assert!(outcome.is_snapshot());
    }

    #[test]
    fn test_failure_outcomes_are_not_snapshots() {
        assert!(!ExtractionOutcome::NotFound("tooltip".to_string()).is_snapshot());
        assert!(!ExtractionOutcome::Timeout.is_snapshot());
        assert!(!ExtractionOutcome::Error("boom".to_string()).is_snapshot());
    }
}
