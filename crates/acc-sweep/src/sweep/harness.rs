//! Running the registry against a list of regions
//!
//! Regions are swept one after another. Within a region the selected
//! sweepers run in dependency waves: every sweeper of a wave runs
//! concurrently, and a wave starts only once the previous one has finished.

use super::context::SweepContext;
use super::orchestrator::SweepOrchestrator;
use super::registry::{RegistryError, SweepRegistry};
use crate::aws::RegionalClients;
use crate::config::SweepConfig;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

type ClientFactory = Arc<dyn Fn(&str) -> RegionalClients + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweeperStatus {
    Succeeded,
    Failed,
    /// Not started because an earlier sweeper failed with `--fail-fast`
    NotRun,
}

impl std::fmt::Display for SweeperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SweeperStatus::Succeeded => "ok",
            SweeperStatus::Failed => "FAILED",
            SweeperStatus::NotRun => "not run",
        };
        f.write_str(s)
    }
}

/// Result of one sweeper in one region
#[derive(Debug, Clone, Serialize)]
pub struct SweeperOutcome {
    pub region: String,
    pub sweeper: String,
    pub status: SweeperStatus,
    /// One entry per underlying failure
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub outcomes: Vec<SweeperOutcome>,
}

impl SweepReport {
    pub fn failures(&self) -> impl Iterator<Item = &SweeperOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == SweeperStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn outcome(&self, region: &str, sweeper: &str) -> Option<&SweeperOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.region == region && o.sweeper == sweeper)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Table of every outcome followed by a one-line summary.
    pub fn render_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Region"),
                Cell::new("Sweeper"),
                Cell::new("Status"),
                Cell::new("Time (s)"),
                Cell::new("Errors"),
            ]);

        for o in &self.outcomes {
            table.add_row(vec![
                Cell::new(&o.region),
                Cell::new(&o.sweeper),
                Cell::new(o.status),
                Cell::new(format!("{:.1}", o.duration_ms as f64 / 1000.0)),
                Cell::new(o.errors.join("\n")),
            ]);
        }

        format!(
            "{table}\n{} sweeper runs, {} failed{}\n",
            self.outcomes.len(),
            self.failures().count(),
            if self.dry_run { " (dry run)" } else { "" }
        )
    }
}

/// Runs the registry over every configured region.
pub struct SweepHarness {
    registry: SweepRegistry,
    config: SweepConfig,
    clients: ClientFactory,
}

impl SweepHarness {
    /// Harness connecting to AWS with the configured profile.
    pub fn new(registry: SweepRegistry, config: SweepConfig) -> Self {
        let profile = config.aws.aws_profile.clone();
        Self {
            registry,
            config,
            clients: Arc::new(move |region: &str| RegionalClients::new(region, profile.clone())),
        }
    }

    /// Replace how per-region clients are created (fakes in tests).
    pub fn with_clients<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> RegionalClients + Send + Sync + 'static,
    {
        self.clients = Arc::new(factory);
        self
    }

    pub fn registry(&self) -> &SweepRegistry {
        &self.registry
    }

    /// Sweep every region.
    ///
    /// Sweeper failures end up in the report; only problems with the
    /// selection itself (unknown name, cycle) are returned as errors, before
    /// anything is deleted.
    pub async fn run(&self) -> Result<SweepReport, RegistryError> {
        let selected = self.registry.select(&self.config.selection.run)?;
        let waves = self.registry.waves(&selected)?;
        let orchestrator = SweepOrchestrator::new(self.config.orchestrator.clone());
        let started_at = Utc::now();
        let mut outcomes = Vec::new();

        info!(
            regions = ?self.config.regions(),
            sweepers = selected.len(),
            dry_run = self.config.dry_run(),
            "Starting sweep"
        );

        for region in self.config.regions() {
            let ctx = Arc::new(SweepContext::new(
                region.as_str(),
                orchestrator.clone(),
                Arc::new((self.clients)(region)),
            ));
            let mut halted = false;

            for wave in &waves {
                if halted {
                    outcomes.extend(wave.iter().map(|entry| SweeperOutcome {
                        region: region.clone(),
                        sweeper: entry.name().to_string(),
                        status: SweeperStatus::NotRun,
                        errors: Vec::new(),
                        duration_ms: 0,
                    }));
                    continue;
                }

                let runs = wave.iter().map(|entry| {
                    let ctx = ctx.clone();
                    async move {
                        info!(region = %region, sweeper = %entry.name(), "Running sweeper");
                        let start = Instant::now();
                        let result = entry.run(ctx).await;
                        (entry, result, start.elapsed())
                    }
                });

                for (entry, result, elapsed) in join_all(runs).await {
                    let (status, errors) = match result {
                        Ok(()) => {
                            info!(region = %region, sweeper = %entry.name(), "Sweeper completed");
                            (SweeperStatus::Succeeded, Vec::new())
                        }
                        Err(failures) => {
                            error!(
                                region = %region,
                                sweeper = %entry.name(),
                                "Sweeper failed: {failures}"
                            );
                            let errors = failures.iter().map(|e| format!("{e:#}")).collect();
                            (SweeperStatus::Failed, errors)
                        }
                    };
                    halted |= status == SweeperStatus::Failed && self.config.fail_fast();
                    outcomes.push(SweeperOutcome {
                        region: region.clone(),
                        sweeper: entry.name().to_string(),
                        status,
                        errors,
                        duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    });
                }

                if halted {
                    warn!(region = %region, "Sweeper failed, not starting remaining sweepers");
                }
            }
        }

        let report = SweepReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: self.config.dry_run(),
            outcomes,
        };
        info!(
            runs = report.outcomes.len(),
            failed = report.failures().count(),
            "Sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(sweeper: &str, status: SweeperStatus, errors: &[&str]) -> SweeperOutcome {
        SweeperOutcome {
            region: "us-west-2".to_string(),
            sweeper: sweeper.to_string(),
            status,
            errors: errors.iter().map(|e| e.to_string()).collect(),
            duration_ms: 1500,
        }
    }

    #[test]
    fn table_lists_errors_and_summary() {
        let now = Utc::now();
        let report = SweepReport {
            started_at: now,
            finished_at: now,
            dry_run: true,
            outcomes: vec![
                outcome("aws_s3_access_point", SweeperStatus::Failed, &["boom"]),
                outcome("aws_s3control_storage_lens_configuration", SweeperStatus::NotRun, &[]),
            ],
        };

        let table = report.render_table();
        assert!(table.contains("aws_s3_access_point"));
        assert!(table.contains("FAILED"));
        assert!(table.contains("not run"));
        assert!(table.contains("boom"));
        assert!(table.ends_with("2 sweeper runs, 1 failed (dry run)\n"));
    }

    #[test]
    fn not_run_is_not_a_failure() {
        let now = Utc::now();
        let report = SweepReport {
            started_at: now,
            finished_at: now,
            dry_run: false,
            outcomes: vec![outcome("a", SweeperStatus::NotRun, &[])],
        };
        assert!(!report.has_failures());
        assert!(report.outcome("us-west-2", "a").is_some());
        assert!(report.outcome("us-east-1", "a").is_none());
    }
}
