use super::extractor::SnapshotExtractor;
use super::session::FetchSession;
use super::snapshot::{ExtractionOutcome, Snapshot};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Итог одного прогона диспетчера
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub snapshots: Vec<Snapshot>,
    pub failed: usize,
    pub total: usize,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.snapshots.len()
    }
}

/// Диспетчер с ограничением параллелизма.
///
/// Запускает по одной задаче на тикер; каждая задача берет один из `limit`
/// пропусков семафора перед обращением к извлекателю, так что одновременно
/// выполняется не больше `limit` извлечений. Каждый тикер обрабатывается
/// ровно один раз; сбой или паника одной задачи фиксируется локально и не
/// прерывает остальные. Метод возвращается только после завершения всех
/// задач (барьер), после чего ровно один раз закрывает сессию.
pub struct BoundedDispatcher<E> {
    extractor: Arc<E>,
    limit: usize,
}

impl<E: SnapshotExtractor + 'static> BoundedDispatcher<E> {
    pub fn new(extractor: E, limit: usize) -> Self {
        Self {
            extractor: Arc::new(extractor),
            limit: limit.max(1),
        }
    }

    pub async fn run(&self, session: FetchSession, symbols: &[String]) -> DispatchReport {
        let total = symbols.len();

        if symbols.is_empty() {
            warn!("Ticker list is empty, nothing to dispatch");
            session.close();
            return DispatchReport::default();
        }

        info!(
            "Dispatching {} tickers with concurrency limit {}",
            total, self.limit
        );

        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut tasks = JoinSet::new();

        for symbol in symbols {
            let semaphore = semaphore.clone();
            let extractor = self.extractor.clone();
            let session = session.clone();
            let symbol = symbol.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (symbol, ExtractionOutcome::Error("semaphore closed".to_string()))
                    }
                };
                let outcome = extractor.extract(&session, &symbol).await;
                (symbol, outcome)
            });
        }

        let mut report = DispatchReport {
            total,
            ..DispatchReport::default()
        };

        // Барьер: собираем итоги всех задач до возврата
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, ExtractionOutcome::Snapshot(snapshot))) => {
                    debug!("{}: snapshot extracted", symbol);
                    report.snapshots.push(snapshot);
                }
                Ok((symbol, ExtractionOutcome::NotFound(reason))) => {
                    warn!("{}: {}", symbol, reason);
                    report.failed += 1;
                }
                Ok((symbol, ExtractionOutcome::Timeout)) => {
                    warn!("{}: navigation timeout", symbol);
                    report.failed += 1;
                }
                Ok((symbol, ExtractionOutcome::Error(detail))) => {
                    error!("{}: extraction failed: {}", symbol, detail);
                    report.failed += 1;
                }
                Err(join_error) => {
                    error!("Extraction task panicked: {}", join_error);
                    report.failed += 1;
                }
            }
        }

        // Сессия закрывается ровно один раз, уже после барьера
        session.close();

        info!(
            "Dispatch complete: {} of {} tickers succeeded, {} failed",
            report.succeeded(),
            report.total,
            report.failed
        );

        report
    }
}
