use failback_core::{JobTracker, job_id_from_location};

use crate::cli::{JobResolveArgs, JobShowArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, HttpControlPlane};
use crate::output::render_job;

pub(crate) async fn handle_job_show(
    ctx: &AppContext,
    args: &JobShowArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let job_id = args.id.trim();
    if job_id.is_empty() {
        return Err(CliError::validation("job id must not be empty"));
    }
    let plane = HttpControlPlane::from_context(ctx)?;
    let job = plane.fetch(job_id).await?;
    render_job(&job, format)
}

pub(crate) fn handle_job_resolve(args: &JobResolveArgs) -> CliResult<()> {
    let job_id = job_id_from_location(&args.location)?;
    println!("{job_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{VAULT_ID, context_for};
    use anyhow::{Result, anyhow};
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn job_show_fetches_snapshot() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(format!("{VAULT_ID}/replicationJobs/job-5"))
                .header("authorization", "Bearer token");
            then.status(200).json_body(json!({
                "id": format!("{VAULT_ID}/replicationJobs/job-5"),
                "name": "job-5",
                "properties": { "state": "Succeeded" }
            }));
        });

        let ctx = context_for(&server)?;
        handle_job_show(
            &ctx,
            &JobShowArgs {
                id: "job-5".to_string(),
            },
            OutputFormat::Table,
        )
        .await
        .map_err(|err| anyhow!(err.display_message()))?;

        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn job_show_rejects_blank_id() -> Result<()> {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server)?;
        let err = handle_job_show(
            &ctx,
            &JobShowArgs {
                id: "  ".to_string(),
            },
            OutputFormat::Table,
        )
        .await
        .err()
        .ok_or_else(|| anyhow!("expected failure"))?;
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[test]
    fn job_resolve_reports_unresolvable_locations() {
        let ok = handle_job_resolve(&JobResolveArgs {
            location: "jobs/job-77".to_string(),
        });
        assert!(ok.is_ok());

        let err = handle_job_resolve(&JobResolveArgs {
            location: "operations/x".to_string(),
        })
        .err();
        assert_eq!(err.map(|err| err.exit_code()), Some(3));
    }
}
