use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Читает список тикеров из текстового файла: один тикер на строку,
/// пустые строки игнорируются, дубликаты отбрасываются с сохранением
/// порядка первого вхождения.
///
/// Тикер используется как имя таблицы в хранилище, поэтому строки
/// с посторонними символами отбрасываются с предупреждением.
pub fn load_symbols(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for line in content.lines() {
        let symbol = line.trim();
        if symbol.is_empty() {
            continue;
        }
        if !is_valid_symbol(symbol) {
            warn!("Skipping invalid ticker symbol: {:?}", symbol);
            continue;
        }
        if seen.insert(symbol.to_string()) {
            symbols.push(symbol.to_string());
        }
    }

    info!("Loaded {} tickers from {}", symbols.len(), path.display());

    Ok(symbols)
}

/// Тикер становится именем таблицы в хранилище, поэтому допускаются
/// только идентификаторные символы.
pub fn is_valid_symbol(symbol: &str) -> bool {
    symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
