//! Configuration types for a sweep

use thiserror::Error;

pub use crate::sweep::orchestrator::OrchestratorConfig;

/// Upper bound on deletions in flight per kind
pub const MAX_CONCURRENCY: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no regions given (use --region or SWEEP_REGIONS)")]
    NoRegions,

    #[error("invalid region name {0:?}")]
    InvalidRegion(String),

    #[error("concurrency must be between 1 and {max}, got {0}", max = MAX_CONCURRENCY)]
    InvalidConcurrency(usize),

    #[error("unknown output format {0:?} (expected table or json)")]
    UnknownFormat(String),
}

/// AWS connection configuration
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// Regions to sweep, in order
    pub regions: Vec<String>,
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
}

/// Which sweepers to run
#[derive(Debug, Clone, Default)]
pub struct SelectionConfig {
    /// Sweeper names; empty means all. Dependencies are added automatically.
    pub run: Vec<String>,
}

/// How the sweep report is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// Runtime behavior flags
#[derive(Debug, Clone, Default)]
pub struct RuntimeFlags {
    /// Stop starting new sweepers in a region after the first failure
    pub fail_fast: bool,
    pub format: OutputFormat,
}

/// Configuration for one sweep invocation
#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    pub aws: AwsConfig,
    pub selection: SelectionConfig,
    pub orchestrator: OrchestratorConfig,
    pub flags: RuntimeFlags,
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aws.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        if let Some(bad) = self.aws.regions.iter().find(|r| !is_region_name(r)) {
            return Err(ConfigError::InvalidRegion(bad.clone()));
        }
        let concurrency = self.orchestrator.concurrency;
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidConcurrency(concurrency));
        }
        Ok(())
    }

    pub fn regions(&self) -> &[String] {
        &self.aws.regions
    }
    pub fn aws_profile(&self) -> Option<&str> {
        self.aws.aws_profile.as_deref()
    }
    pub fn dry_run(&self) -> bool {
        self.orchestrator.dry_run
    }
    pub fn fail_fast(&self) -> bool {
        self.flags.fail_fast
    }
}

/// Lowercase letters, digits and dashes, e.g. `us-gov-west-1`
fn is_region_name(s: &str) -> bool {
    !s.is_empty()
        && s.contains('-')
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
