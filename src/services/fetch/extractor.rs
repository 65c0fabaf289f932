use super::session::FetchSession;
use super::snapshot::{ExtractionOutcome, Snapshot};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Способность получить срез котировки по одному тикеру.
///
/// Единственная точка, где живет знание о конкретной странице. Сбой любого
/// рода выражается вариантом `ExtractionOutcome`, а не ошибкой.
#[async_trait]
pub trait SnapshotExtractor: Send + Sync {
    async fn extract(&self, session: &FetchSession, symbol: &str) -> ExtractionOutcome;
}

/// Извлекает минутный срез из тултипа графика на странице инструмента MOEX.
///
/// Обязательные элементы — контейнер тултипа и элемент даты: без них
/// возвращается `NotFound`. Отдельные ценовые поля опциональны: отсутствие
/// или неразборчивость значения дает null в поле, а не отказ всего среза.
pub struct MoexPageExtractor {
    base_url: String,
    tooltip_selector: Selector,
    date_selector: Selector,
    span_selector: Selector,
}

impl MoexPageExtractor {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            tooltip_selector: Selector::parse("ul.tooltip").expect("valid CSS selector"),
            date_selector: Selector::parse(".date").expect("valid CSS selector"),
            span_selector: Selector::parse("li span").expect("valid CSS selector"),
        }
    }

    fn parse_document(&self, symbol: &str, html: &str) -> ExtractionOutcome {
        let document = Html::parse_document(html);

        let Some(tooltip) = document.select(&self.tooltip_selector).next() else {
            return ExtractionOutcome::NotFound(format!("{}: tooltip not found", symbol));
        };

        let Some(date_element) = tooltip.select(&self.date_selector).next() else {
            return ExtractionOutcome::NotFound(format!("{}: date not found", symbol));
        };

        let date_text = element_text(&date_element);
        let mut parts = date_text.split_whitespace();
        let (Some(date_part), Some(time_part)) = (parts.next(), parts.next()) else {
            return ExtractionOutcome::NotFound(format!(
                "{}: malformed date element: {:?}",
                symbol, date_text
            ));
        };

        let Some(date) = parse_date(date_part) else {
            return ExtractionOutcome::NotFound(format!(
                "{}: unparsable date: {:?}",
                symbol, date_part
            ));
        };
        let Some(time) = parse_time(time_part) else {
            return ExtractionOutcome::NotFound(format!(
                "{}: unparsable time: {:?}",
                symbol, time_part
            ));
        };

        let mut snapshot = Snapshot {
            symbol: symbol.to_string(),
            date,
            time,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        };

        // Подписи значений в тултипе на русском
        for span in tooltip.select(&self.span_selector) {
            let text = element_text(&span);
            if text.contains("Объём") {
                snapshot.volume = parse_volume(&text);
            } else if text.contains("Открытие") {
                snapshot.open = parse_price(&text);
            } else if text.contains("Макс") {
                snapshot.high = parse_price(&text);
            } else if text.contains("Мин") {
                snapshot.low = parse_price(&text);
            } else if text.contains("Закрытие") {
                snapshot.close = parse_price(&text);
            }
        }

        ExtractionOutcome::Snapshot(snapshot)
    }
}

#[async_trait]
impl SnapshotExtractor for MoexPageExtractor {
    async fn extract(&self, session: &FetchSession, symbol: &str) -> ExtractionOutcome {
        let url = format!("{}{}", self.base_url, symbol);
        debug!("Fetching {}", url);

        let response = match session.client().get(&url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return ExtractionOutcome::Timeout,
            Err(e) => return ExtractionOutcome::Error(e.to_string()),
        };

        if !response.status().is_success() {
            return ExtractionOutcome::Error(format!(
                "{}: HTTP status {}",
                symbol,
                response.status()
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return ExtractionOutcome::Timeout,
            Err(e) => return ExtractionOutcome::Error(e.to_string()),
        };

        self.parse_document(symbol, &body)
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Цена — последний токен подписи, десятичный разделитель запятая:
/// "Открытие: 274,50" -> 274.50. Неразборчивое значение дает None.
fn parse_price(text: &str) -> Option<f64> {
    let raw = text.split_whitespace().next_back()?;
    raw.replace(',', ".").parse().ok()
}

/// Объем идет с разделителями разрядов и знаком валюты:
/// "Объём: 1 234 567,89 ₽" -> 1234567.89
fn parse_volume(text: &str) -> Option<f64> {
    let raw = text.split(':').next_back()?;
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '₽')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse().ok()
}
