//! Argument parsing and command dispatch for the `failback` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use failback_core::defaults::DEFAULT_VAULT_LOCATION;
use failback_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_url};
use crate::commands::apply::handle_apply_recovery_point;
use crate::commands::jobs::{handle_job_resolve, handle_job_show};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_API_URL: &str = "https://management.azure.com";
const DEFAULT_API_VERSION: &str = "2023-08-01";

/// Parses CLI arguments, executes the requested command, and reports failures.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let trace_id = Uuid::new_v4().to_string();
    let command = command_label(&cli.command);
    tracing::debug!(command, trace_id = %trace_id, "dispatching command");

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let ctx = AppContext::from_cli(&cli, trace_id)?;

    match cli.command {
        Command::ApplyRecoveryPoint(args) => {
            handle_apply_recovery_point(&ctx, args, cli.output).await
        }
        Command::Job(jobs) => match jobs {
            JobCommand::Show(args) => handle_job_show(&ctx, &args, cli.output).await,
            JobCommand::Resolve(args) => handle_job_resolve(&args),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "failback",
    about = "Apply recovery points to replicated workloads and track the resulting jobs"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "FAILBACK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "FAILBACK_VAULT_ID",
        help = "Resource path of the recovery vault"
    )]
    pub(crate) vault_id: Option<String>,
    #[arg(
        long,
        global = true,
        env = "FAILBACK_API_VERSION",
        default_value = DEFAULT_API_VERSION
    )]
    pub(crate) api_version: String,
    #[arg(long, global = true, env = "FAILBACK_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: Option<String>,
    #[arg(
        long,
        global = true,
        env = "FAILBACK_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "FAILBACK_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "FAILBACK_LOG_FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Apply a recovery point to a protected item.
    ApplyRecoveryPoint(ApplyRecoveryPointArgs),
    /// Inspect replication jobs.
    #[command(subcommand)]
    Job(JobCommand),
}

#[derive(Subcommand)]
pub(crate) enum JobCommand {
    /// Fetch the current snapshot of a job.
    Show(JobShowArgs),
    /// Print the job identifier a location reference points at.
    Resolve(JobResolveArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ApplyRecoveryPointArgs {
    #[arg(long, help = "Recovery point identifier to apply")]
    pub(crate) recovery_point_id: String,
    #[arg(long, help = "Full resource identifier of the protected item")]
    pub(crate) protected_item_id: String,
    #[arg(long, help = "Protected item resource name")]
    pub(crate) protected_item_name: String,
    #[arg(long, help = "Replication provider of the protected item")]
    pub(crate) provider: String,
    #[arg(long, help = "Display name shown when confirming")]
    pub(crate) friendly_name: Option<String>,
    #[arg(long, help = "Primary key-encryption certificate (PFX)")]
    pub(crate) primary_kek_certificate: Option<PathBuf>,
    #[arg(long, help = "Secondary key-encryption certificate (PFX)")]
    pub(crate) secondary_kek_certificate: Option<PathBuf>,
    #[arg(
        long,
        env = "FAILBACK_VAULT_LOCATION",
        default_value = DEFAULT_VAULT_LOCATION,
        help = "Location tag written into provider payloads that carry one"
    )]
    pub(crate) vault_location: String,
    #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Args, Debug)]
pub(crate) struct JobShowArgs {
    #[arg(help = "Job name")]
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct JobResolveArgs {
    #[arg(help = "Location reference returned by a submission")]
    pub(crate) location: String,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::ApplyRecoveryPoint(_) => "apply_recovery_point",
        Command::Job(JobCommand::Show(_)) => "job_show",
        Command::Job(JobCommand::Resolve(_)) => "job_resolve",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_apply_recovery_point_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "failback",
            "--vault-id",
            "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.RecoveryServices/vaults/v1",
            "apply-recovery-point",
            "--recovery-point-id",
            "rp-123",
            "--protected-item-id",
            "/replicationFabrics/F1/replicationProtectionContainers/C1/replicationProtectedItems/vm-01",
            "--protected-item-name",
            "vm-01",
            "--provider",
            "HyperVReplicaAzure",
            "--primary-kek-certificate",
            "cert.pfx",
            "--yes",
        ])?;

        assert_eq!(command_label(&cli.command), "apply_recovery_point");
        let Command::ApplyRecoveryPoint(args) = cli.command else {
            anyhow::bail!("expected apply-recovery-point");
        };
        assert_eq!(args.recovery_point_id, "rp-123");
        assert_eq!(args.primary_kek_certificate, Some(PathBuf::from("cert.pfx")));
        assert!(args.secondary_kek_certificate.is_none());
        assert!(args.yes);
        Ok(())
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(
            Cli::try_parse_from(["failback", "--log-format", "xml", "job", "resolve", "jobs/j"])
                .is_err()
        );
    }
}
