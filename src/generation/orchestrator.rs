//! Generation orchestrator
//!
//! Drives fresh generation and regeneration of completion records. Items run concurrently,
//! bounded by an owned semaphore; within an item, field generators fan out and are joined
//! before the record is merged and persisted. Field failures are recorded on the record and
//! never abort the item.

use crate::error::ApiError;
use crate::generation::fields::{
    slot_for, FieldContext, FieldResult, FieldSlot, RecordPatch, FIELD_SLOTS,
};
use crate::generation::prompts::PromptTemplates;
use crate::model::{
    CategoryMap, CompletionError, CompletionErrorKind, CompletionInput, CompletionPrompts,
    CompletionRecord,
};
use crate::provider::{CompletionService, ImageSearchClient};
use crate::store::CompletionStore;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_CONCURRENT_ITEMS: usize = 4;

/// How one item ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Persisted with every field generated
    Ok,
    /// Persisted with the listed fields still failing
    Failed { kinds: Vec<CompletionErrorKind> },
    /// Nothing to do: already generated, or nothing failed
    Skipped,
    /// Nothing persisted: the store or the limiter failed
    Aborted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub key: String,
    pub status: ItemStatus,
}

impl ItemOutcome {
    fn new(key: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            key: key.into(),
            status,
        }
    }

    fn aborted(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            key,
            ItemStatus::Aborted {
                reason: reason.into(),
            },
        )
    }

    fn from_record(record: &CompletionRecord) -> Self {
        let status = match &record.errors {
            Some(errors) if !errors.is_empty() => ItemStatus::Failed {
                kinds: errors.iter().map(|e| e.kind).collect(),
            },
            _ => ItemStatus::Ok,
        };
        Self::new(record.key(), status)
    }
}

/// Per-item outcomes of a batch, with counts by status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub outcomes: Vec<ItemOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: usize,
}

impl GenerationReport {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome.status {
            ItemStatus::Ok => self.succeeded += 1,
            ItemStatus::Failed { .. } => self.failed += 1,
            ItemStatus::Skipped => self.skipped += 1,
            ItemStatus::Aborted { .. } => self.aborted += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

pub struct ArticleGenerator {
    completions: Arc<CompletionService>,
    images: Arc<dyn ImageSearchClient>,
    store: Arc<dyn CompletionStore>,
    categories: Arc<CategoryMap>,
    prompts: PromptTemplates,
    permits: Arc<Semaphore>,
}

impl ArticleGenerator {
    pub fn new(
        completions: Arc<CompletionService>,
        images: Arc<dyn ImageSearchClient>,
        store: Arc<dyn CompletionStore>,
        categories: Arc<CategoryMap>,
        prompts: PromptTemplates,
    ) -> Self {
        Self {
            completions,
            images,
            store,
            categories,
            prompts,
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_ITEMS)),
        }
    }

    /// Bound the number of items in flight. Zero is treated as one.
    pub fn with_max_concurrent_items(mut self, max: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    /// Generate and persist every input, skipping keys that already have a record.
    pub async fn start_generation(&self, inputs: Vec<CompletionInput>) -> GenerationReport {
        info!(items = inputs.len(), "Starting generation");
        let mut report = GenerationReport::default();
        let mut futures = FuturesUnordered::new();
        for input in &inputs {
            futures.push(self.generate_article(input));
        }
        while let Some(outcome) = futures.next().await {
            report.record(outcome);
        }
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            aborted = report.aborted,
            "Generation finished"
        );
        report
    }

    /// Regenerate the failed fields of every record that has errors.
    ///
    /// Fails only when the failed records cannot be listed.
    pub async fn regenerate_articles(&self) -> Result<GenerationReport, ApiError> {
        let failed = self.store.find_failed()?;
        info!(items = failed.len(), "Starting regeneration");

        let mut report = GenerationReport::default();
        let mut futures = FuturesUnordered::new();
        for record in failed {
            futures.push(self.regenerate_listed(record));
        }
        while let Some(outcome) = futures.next().await {
            report.record(outcome);
        }
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            aborted = report.aborted,
            "Regeneration finished"
        );
        Ok(report)
    }

    /// Generate all fields for `input` and insert the record.
    pub async fn generate_article(&self, input: &CompletionInput) -> ItemOutcome {
        let _permit = match self.acquire().await {
            Ok(permit) => permit,
            Err(reason) => return ItemOutcome::aborted(&input.key, reason),
        };

        match self.store.find_by_key(&input.key) {
            Ok(Some(_)) => {
                debug!(key = %input.key, "Record exists, skipping");
                return ItemOutcome::new(&input.key, ItemStatus::Skipped);
            }
            Ok(None) => {}
            Err(err) => return self.abort(&input.key, err.to_string()),
        }

        let prompts = self.prompts.render(input);
        let results = self.run_slots(input, &prompts, FIELD_SLOTS.iter()).await;

        let mut record = CompletionRecord::new(input.clone(), prompts);
        record.title = Some(self.prompts.title(input));
        let mut errors = Vec::new();
        for (_, result) in results {
            match result {
                Ok(patch) => patch(&mut record),
                Err(error) => errors.push(error),
            }
        }
        record.set_errors(errors);

        if let Err(err) = self.store.insert(&record) {
            return self.abort(&input.key, err.to_string());
        }
        self.finish(&record)
    }

    /// Retry the failed fields of the stored record for `key`.
    ///
    /// Errors with no generator behind them (TITLE) are kept as they are.
    pub async fn regenerate_article(&self, key: &str) -> ItemOutcome {
        let _permit = match self.acquire().await {
            Ok(permit) => permit,
            Err(reason) => return ItemOutcome::aborted(key, reason),
        };

        match self.store.find_by_key(key) {
            Ok(Some(record)) => self.regenerate_record(record).await,
            Ok(None) => self.abort(key, format!("Record not found: {}", key)),
            Err(err) => self.abort(key, err.to_string()),
        }
    }

    /// Regenerate a record already read by the batch listing.
    async fn regenerate_listed(&self, record: CompletionRecord) -> ItemOutcome {
        let _permit = match self.acquire().await {
            Ok(permit) => permit,
            Err(reason) => return ItemOutcome::aborted(record.key(), reason),
        };
        self.regenerate_record(record).await
    }

    async fn regenerate_record(&self, mut record: CompletionRecord) -> ItemOutcome {
        let key = record.key().to_string();
        let previous = match record.errors.take() {
            Some(errors) if !errors.is_empty() => errors,
            _ => {
                debug!(key = %key, "No failed fields, skipping");
                return ItemOutcome::new(key, ItemStatus::Skipped);
            }
        };

        let kinds = failed_kinds(&previous);
        let slots = kinds.iter().filter_map(|kind| slot_for(*kind));
        let prompts = self.prompts.render(&record.input);
        let mut results = self.run_slots(&record.input, &prompts, slots).await;

        let mut errors = Vec::new();
        for kind in kinds {
            let position = results.iter().position(|(k, _)| *k == kind);
            match position.map(|i| results.swap_remove(i)) {
                Some((_, Ok(patch))) => patch(&mut record),
                Some((_, Err(error))) => errors.push(error),
                None => errors.extend(previous.iter().filter(|e| e.kind == kind).cloned()),
            }
        }
        record.set_errors(errors);

        if let Err(err) = self.store.update_by_key(&key, &record) {
            return self.abort(&key, err.to_string());
        }
        self.finish(&record)
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, String> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| format!("Concurrency limiter closed: {}", e))
    }

    async fn run_slots<'s>(
        &self,
        input: &CompletionInput,
        prompts: &CompletionPrompts,
        slots: impl Iterator<Item = &'s FieldSlot>,
    ) -> Vec<(CompletionErrorKind, FieldResult<RecordPatch>)> {
        let ctx = FieldContext {
            completions: self.completions.as_ref(),
            images: self.images.as_ref(),
            categories: self.categories.as_ref(),
            input,
            prompts,
        };
        let ctx = &ctx;
        join_all(slots.map(|slot| async move { (slot.kind, (slot.generate)(ctx).await) })).await
    }

    fn finish(&self, record: &CompletionRecord) -> ItemOutcome {
        let outcome = ItemOutcome::from_record(record);
        match &outcome.status {
            ItemStatus::Failed { kinds } => {
                let reasons: Vec<String> = record
                    .errors
                    .iter()
                    .flatten()
                    .map(CompletionError::to_string)
                    .collect();
                warn!(key = record.key(), kinds = ?kinds, errors = ?reasons, "FAILED");
            }
            _ => info!(key = record.key(), "OK"),
        }
        outcome
    }

    fn abort(&self, key: &str, reason: String) -> ItemOutcome {
        warn!(key, reason = %reason, "Item aborted");
        ItemOutcome::aborted(key, reason)
    }
}

/// Distinct error kinds in first-seen order.
fn failed_kinds(errors: &[CompletionError]) -> Vec<CompletionErrorKind> {
    let mut kinds = Vec::new();
    for error in errors {
        if !kinds.contains(&error.kind) {
            kinds.push(error.kind);
        }
    }
    kinds
}
