use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::media_gate::MediaGate;
use crate::pipeline::source::RawSourceAdapter;
use crate::pipeline::validate::{self, ValidationFailure};
use crate::pipeline::{dedupe, redact};
use crate::types::{FieldNames, ProcessedRecord, RawRecord};

/// Counters for a single processed-feed run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FeedRunStats {
    pub fetched: usize,
    pub invalid: usize,
    pub duplicate: usize,
    pub unsafe_media: usize,
    pub published: usize,
}

/// Composes the pipeline stages into the two feed operations.
///
/// Holds no per-run state, so one instance serves concurrent requests.
pub struct FeedUseCase {
    source: RawSourceAdapter,
    fields: FieldNames,
    media_gate: MediaGate,
}

impl FeedUseCase {
    pub fn new(source: RawSourceAdapter, fields: FieldNames, media_gate: MediaGate) -> Self {
        Self {
            source,
            fields,
            media_gate,
        }
    }

    /// Validated, deduplicated, moderated and redacted records in source order
    pub async fn processed_feed(&self) -> Result<Vec<ProcessedRecord>> {
        self.processed_feed_with_stats().await.map(|(records, _)| records)
    }

    #[instrument(skip(self), fields(range = %self.source.range(), gate = self.media_gate.backend_name()))]
    pub async fn processed_feed_with_stats(&self) -> Result<(Vec<ProcessedRecord>, FeedRunStats)> {
        metrics::pipeline::processed_run();
        let batch = self.source.fetch().await;
        self.warn_on_missing_headers(&batch);

        let mut stats = FeedRunStats {
            fetched: batch.len(),
            ..FeedRunStats::default()
        };
        let mut accepted_descriptions: Vec<String> = Vec::new();
        let mut published = Vec::new();

        for record in batch {
            let title = record.field(&self.fields.title).to_string();

            if let Err(failure) = validate::check(&record, &self.fields) {
                stats.invalid += 1;
                metrics::pipeline::record_rejected("invalid");
                debug!(title = %title, reason = %describe(failure), "Rejected invalid record");
                continue;
            }

            let description = record.field(&self.fields.description);
            if dedupe::is_duplicate(description, &accepted_descriptions) {
                stats.duplicate += 1;
                metrics::pipeline::record_rejected("duplicate");
                info!(title = %title, "Duplicate detected");
                continue;
            }

            let image = record.field(&self.fields.image).trim();
            if !image.is_empty() && !self.media_gate.is_safe(image).await {
                stats.unsafe_media += 1;
                metrics::pipeline::record_rejected("unsafe_media");
                info!(title = %title, image = %image, "Unsafe image detected");
                continue;
            }

            accepted_descriptions.push(description.to_string());
            let redacted = redact::redact_phone(record, &self.fields);
            published.push(ProcessedRecord::from_redacted(redacted));
        }

        stats.published = published.len();
        metrics::pipeline::records_published(stats.published);
        info!(
            fetched = stats.fetched,
            invalid = stats.invalid,
            duplicate = stats.duplicate,
            unsafe_media = stats.unsafe_media,
            published = stats.published,
            "Processed news feed"
        );

        Ok((published, stats))
    }

    /// Every fetched record verbatim: unvalidated, unmoderated, unmasked
    #[instrument(skip(self), fields(range = %self.source.range()))]
    pub async fn raw_feed(&self) -> Result<Vec<RawRecord>> {
        metrics::pipeline::raw_run();
        let batch = self.source.fetch().await;
        debug!("Serving {} raw records", batch.len());
        Ok(batch)
    }

    fn warn_on_missing_headers(&self, batch: &[RawRecord]) {
        if let Some(first) = batch.first() {
            let missing = self.fields.missing_from(first);
            if !missing.is_empty() {
                warn!(?missing, "Source is missing expected columns");
            }
        }
    }
}

fn describe(failure: ValidationFailure) -> String {
    match failure {
        ValidationFailure::MissingTitle => "missing title".to_string(),
        ValidationFailure::MissingDescription => "missing description".to_string(),
        ValidationFailure::DescriptionTooShort { chars } => {
            format!("description has {} characters", chars)
        }
    }
}
