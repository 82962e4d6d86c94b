//! acc-sweep: deletes resources left behind by acceptance tests
//!
//! Runs every registered sweeper (or a selection) against one or more
//! regions and reports what failed.

use acc_sweep::aws::AwsError;
use acc_sweep::config::{
    self, AwsConfig, OrchestratorConfig, OutputFormat, RuntimeFlags, SelectionConfig, SweepConfig,
};
use acc_sweep::sweep::SweepHarness;
use acc_sweep::sweep::orchestrator::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES};
use acc_sweep::sweepers::default_registry;
use acc_sweep_common::regions::parse_region_list;
use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "acc-sweep")]
#[command(about = "Sweep leftover acceptance-test resources from an AWS account")]
#[command(version)]
struct Args {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SweepArgs {
    /// Comma-separated regions to sweep, in order
    #[arg(long, env = "SWEEP_REGIONS")]
    region: String,

    /// Comma-separated sweeper names to run (default: all).
    /// Dependencies of the named sweepers are run too.
    #[arg(long, env = "SWEEP_RUN")]
    run: Option<String>,

    /// Stop starting sweepers in a region once one has failed
    #[arg(long)]
    fail_fast: bool,

    /// List what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Deletions in flight per resource kind
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Retries per deletion for throttling and dependency conflicts
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: usize,

    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

impl SweepArgs {
    /// Parse sweeper names from the comma-separated string
    fn parse_run_list(&self) -> Vec<String> {
        self.run
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl From<SweepArgs> for SweepConfig {
    fn from(args: SweepArgs) -> Self {
        let run = args.parse_run_list();
        Self {
            aws: AwsConfig {
                regions: parse_region_list(&args.region),
                aws_profile: args.profile,
            },
            selection: SelectionConfig { run },
            orchestrator: OrchestratorConfig {
                concurrency: args.concurrency,
                max_retries: args.max_retries,
                dry_run: args.dry_run,
                ..OrchestratorConfig::default()
            },
            flags: RuntimeFlags {
                fail_fast: args.fail_fast,
                format: args.format,
            },
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover and delete leftover resources
    Sweep(Box<SweepArgs>),

    /// List registered sweepers in execution order
    List {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    let hint = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
        .and_then(AwsError::suggestion);
    if let Some(hint) = hint {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    // Reduce noise from the AWS SDK (show only warnings and errors)
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    for target in [
        "aws_config",
        "aws_sdk_s3control",
        "aws_sdk_sts",
        "aws_smithy_runtime",
        "aws_smithy_http",
    ] {
        filter = filter.add_directive(format!("{target}=warn").parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let registry = default_registry()?;

    match args.command {
        Command::Sweep(sweep_args) => {
            let config: config::SweepConfig = (*sweep_args).into();
            config.validate()?;

            if let Some(profile) = config.aws_profile() {
                info!(profile = %profile, "Using AWS profile");
            }

            let format = config.flags.format;
            let report = SweepHarness::new(registry, config).run().await?;

            match format {
                OutputFormat::Json => println!("{}", report.to_json()?),
                OutputFormat::Table => print!("{}", report.render_table()),
            }

            let failed = report.failures().count();
            if failed > 0 {
                anyhow::bail!("{failed} sweeper run(s) failed");
            }
        }

        Command::List { format } => {
            let order = registry.execution_order()?;
            match format {
                OutputFormat::Json => {
                    let entries: Vec<_> = order
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "name": e.name(),
                                "dependencies": e.dependencies(),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                OutputFormat::Table => {
                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL_CONDENSED)
                        .set_header(vec![Cell::new("Sweeper"), Cell::new("Depends on")]);
                    for e in order {
                        table.add_row(vec![
                            Cell::new(e.name()),
                            Cell::new(e.dependencies().join(", ")),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}
