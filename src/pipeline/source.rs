use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::app::ports::SheetRowsPort;
use crate::error::FeedError;
use crate::observability::metrics;
use crate::types::{FetchOutcome, RawRecord};

/// Turns a spreadsheet range into an ordered batch of [`RawRecord`]s.
///
/// Fetch failures never escape: they are logged and reported as
/// [`FetchOutcome::Failed`], which reads as an empty batch.
pub struct RawSourceAdapter {
    rows: Arc<dyn SheetRowsPort>,
    range: String,
    timeout: Duration,
}

impl RawSourceAdapter {
    pub fn new(rows: Arc<dyn SheetRowsPort>, range: impl Into<String>, timeout: Duration) -> Self {
        Self {
            rows,
            range: range.into(),
            timeout,
        }
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    /// Fetch the batch, degrading to an empty list on any failure
    pub async fn fetch(&self) -> Vec<RawRecord> {
        self.fetch_outcome().await.into_records()
    }

    #[instrument(skip(self), fields(range = %self.range))]
    pub async fn fetch_outcome(&self) -> FetchOutcome {
        info!("Fetching news rows");
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.rows.fetch_rows(&self.range)).await;
        metrics::source::fetch_duration(started.elapsed().as_secs_f64());

        let rows = match result {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                metrics::source::fetch_failed(error_kind(&e));
                warn!("Failed to fetch news rows, serving empty batch: {}", e);
                return FetchOutcome::Failed(e.to_string());
            }
            Err(_) => {
                let e = FeedError::Timeout {
                    operation: "sheet fetch",
                    seconds: self.timeout.as_secs(),
                };
                metrics::source::fetch_failed("timeout");
                warn!("Failed to fetch news rows, serving empty batch: {}", e);
                return FetchOutcome::Failed(e.to_string());
            }
        };

        let records = rows_to_records(rows);
        if records.is_empty() {
            metrics::source::fetch_empty();
            info!("Source returned no data rows");
            return FetchOutcome::Empty;
        }

        metrics::source::fetch_succeeded(records.len());
        info!("Fetched {} news rows", records.len());
        FetchOutcome::Records(records)
    }
}

/// Map header-first rows to records.
///
/// Header cells are trimmed. Short rows are padded with empty strings, cells
/// past the header width are dropped, and a repeated header keeps the
/// rightmost column's value.
pub fn rows_to_records(rows: Vec<Vec<String>>) -> Vec<RawRecord> {
    let mut rows = rows.into_iter();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|h| h.trim().to_string()).collect(),
        None => return Vec::new(),
    };

    rows.map(|row| {
        let mut cells = row.into_iter();
        headers
            .iter()
            .map(|header| (header.clone(), cells.next().unwrap_or_default()))
            .collect::<RawRecord>()
    })
    .collect()
}

fn error_kind(e: &FeedError) -> &'static str {
    match e {
        FeedError::Http(_) => "http",
        FeedError::Api { .. } => "api",
        FeedError::Json(_) => "decode",
        FeedError::Credentials(_) | FeedError::Jwt(_) => "auth",
        FeedError::Timeout { .. } => "timeout",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    struct StaticRows(Vec<Vec<String>>);

    #[async_trait]
    impl SheetRowsPort for StaticRows {
        async fn fetch_rows(&self, _range: &str) -> Result<Vec<Vec<String>>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRows;

    #[async_trait]
    impl SheetRowsPort for BrokenRows {
        async fn fetch_rows(&self, _range: &str) -> Result<Vec<Vec<String>>> {
            Err(FeedError::Api {
                status: 403,
                message: "The caller does not have permission".into(),
            })
        }
    }

    struct HangingRows;

    #[async_trait]
    impl SheetRowsPort for HangingRows {
        async fn fetch_rows(&self, _range: &str) -> Result<Vec<Vec<String>>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    fn adapter(rows: impl SheetRowsPort + 'static) -> RawSourceAdapter {
        RawSourceAdapter::new(Arc::new(rows), "sheet1!A:H", Duration::from_millis(50))
    }

    #[test]
    fn test_header_is_trimmed_and_rows_padded() {
        let records = rows_to_records(vec![
            row(&[" News Title ", "City", "Publishers Phone Number"]),
            row(&["Roadworks on MG Road"]),
        ]);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.get("News Title"), Some("Roadworks on MG Road"));
        assert_eq!(record.get("City"), Some(""));
        assert_eq!(record.get("Publishers Phone Number"), Some(""));
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let records = rows_to_records(vec![row(&["A"]), row(&["1", "2", "3"])]);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0].get("A"), Some("1"));
    }

    #[test]
    fn test_repeated_header_keeps_rightmost() {
        let records = rows_to_records(vec![row(&["A", "A"]), row(&["left", "right"])]);
        assert_eq!(records[0].get("A"), Some("right"));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(rows_to_records(vec![row(&["A", "B"])]).is_empty());
        assert!(rows_to_records(Vec::new()).is_empty());
    }

    #[test]
    fn test_row_order_is_preserved() {
        let records = rows_to_records(vec![row(&["n"]), row(&["1"]), row(&["2"]), row(&["3"])]);
        let order: Vec<&str> = records.iter().map(|r| r.field("n")).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_fetch_error_degrades_to_failed() {
        let outcome = adapter(BrokenRows).fetch_outcome().await;
        assert!(outcome.is_failed());
        assert!(adapter(BrokenRows).fetch().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_timeout_degrades_to_failed() {
        let outcome = adapter(HangingRows).fetch_outcome().await;
        assert!(matches!(outcome, FetchOutcome::Failed(reason) if reason.contains("Timed out")));
    }

    #[tokio::test]
    async fn test_header_only_sheet_is_empty_not_failed() {
        let outcome = adapter(StaticRows(vec![row(&["News Title"])])).fetch_outcome().await;
        assert_eq!(outcome, FetchOutcome::Empty);
    }

    #[tokio::test]
    async fn test_fetch_returns_records() {
        let outcome = adapter(StaticRows(vec![row(&["News Title"]), row(&["Hello"])]))
            .fetch_outcome()
            .await;
        match outcome {
            FetchOutcome::Records(records) => assert_eq!(records[0].field("News Title"), "Hello"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
