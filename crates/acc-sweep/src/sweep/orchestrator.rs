//! Deletion of discovered resources
//!
//! The orchestrator attempts every deletion it is given, with bounded
//! concurrency and retries for throttling and dependency conflicts, and
//! reports every failure it could not recover from.

use super::errors::SweepErrors;
use super::sweepable::Sweepable;
use crate::aws::classify_anyhow_error;
use anyhow::{Context, Result};
use backon::{ExponentialBuilder, Retryable};
use futures::StreamExt;
use futures::stream;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of deletions in flight per batch
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default retry budget for a single deletion
pub const DEFAULT_MAX_RETRIES: usize = 10;

/// Deletion policy
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Deletions in flight at once
    pub concurrency: usize,
    /// Retries per deletion for retryable errors
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Log what would be deleted without deleting anything
    pub dry_run: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            dry_run: false,
        }
    }
}

/// Executes the deletion of a batch of [`Sweepable`]s.
#[derive(Debug, Clone, Default)]
pub struct SweepOrchestrator {
    config: OrchestratorConfig,
}

impl SweepOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Delete every sweepable in the batch.
    ///
    /// One failure never stops the others. Each failure is reported once,
    /// wrapped with the kind and id of the resource. A `(kind, id)` pair
    /// that appears more than once is deleted once.
    pub async fn run(&self, sweepables: Vec<Sweepable>) -> Result<(), SweepErrors> {
        if sweepables.is_empty() {
            debug!("Nothing to sweep");
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(sweepables.len());
        let mut skipped = 0usize;
        for sweepable in sweepables {
            if seen.insert((sweepable.kind(), sweepable.id().to_string())) {
                unique.push(sweepable);
            } else {
                debug!(resource = %sweepable, "Skipping duplicate");
                skipped += 1;
            }
        }

        if self.config.dry_run {
            for sweepable in &unique {
                info!(kind = %sweepable.kind(), id = %sweepable.id(), "[DRY RUN] Would delete");
            }
            info!(count = unique.len(), "[DRY RUN] Sweep batch complete");
            return Ok(());
        }

        let total = unique.len();
        let results: Vec<Result<()>> = stream::iter(unique)
            .map(|sweepable| self.delete_with_retry(sweepable))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut errors = SweepErrors::new();
        for result in results {
            if let Err(e) = result {
                errors.push(e);
            }
        }

        info!(
            deleted = total - errors.len(),
            failed = errors.len(),
            skipped,
            "Sweep batch complete"
        );
        errors.into_result()
    }

    async fn delete_with_retry(&self, sweepable: Sweepable) -> Result<()> {
        debug!(resource = %sweepable, "Deleting");

        (|| sweepable.delete())
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.config.min_delay)
                    .with_max_delay(self.config.max_delay)
                    .with_max_times(self.config.max_retries)
                    .with_jitter(),
            )
            .when(|e| classify_anyhow_error(e).is_retryable())
            .notify(|e, dur| {
                warn!(
                    resource = %sweepable,
                    delay = ?dur,
                    error = %e,
                    "Deletion failed, retrying..."
                );
            })
            .await
            .with_context(|| format!("deleting {sweepable}"))
    }
}
