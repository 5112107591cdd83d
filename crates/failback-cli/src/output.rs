//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use failback_core::Job;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_job(job: &Job, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(job)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            for line in job_lines(job) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn job_lines(job: &Job) -> Vec<String> {
    let mut lines = vec![
        format!("id: {}", job.id),
        format!("name: {}", job.name),
        format!("state: {}", job.state),
    ];
    let optional = [
        ("detail", job.state_description.as_deref()),
        ("scenario", job.scenario_name.as_deref()),
        ("target", job.target_object_name.as_deref()),
        ("target id", job.target_object_id.as_deref()),
        ("provider", job.target_instance_type.as_deref()),
        ("activity", job.activity_id.as_deref()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    if let Some(started) = job.start_time {
        lines.push(format!("started: {}", format_time(started)));
    }
    if let Some(ended) = job.end_time {
        lines.push(format!("ended: {}", format_time(ended)));
    }
    if !job.allowed_actions.is_empty() {
        lines.push(format!("allowed actions: {}", job.allowed_actions.join(", ")));
    }
    if !job.errors.is_empty() {
        lines.push("errors:".to_string());
        lines.extend(job.errors.iter().map(|error| format!("  - {error}")));
    }
    lines
}

fn format_time(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
