use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use failback_core::{
    CertificateMaterialLoader, ConfirmationGate, FailbackError, FailbackResult, Orchestrator,
    OrchestratorDeps, PayloadOptions, RecoveryPoint, RecoveryRequest, ReplicationProtectedItem,
};

use crate::cli::{ApplyRecoveryPointArgs, OutputFormat};
use crate::client::{AppContext, CliResult, HttpControlPlane};
use crate::output::render_job;

/// Reads certificate material from the local filesystem.
pub(crate) struct FileCertificateLoader;

impl CertificateMaterialLoader for FileCertificateLoader {
    fn load(&self, path: &Path) -> FailbackResult<Vec<u8>> {
        std::fs::read(path).map_err(|source| FailbackError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Confirmation gate backed by `--yes` or an interactive `y/N` prompt.
///
/// Non-interactive sessions without `--yes` decline.
pub(crate) struct PromptConfirmation {
    pub(crate) assume_yes: bool,
}

impl ConfirmationGate for PromptConfirmation {
    fn should_proceed(&self, subject: &str, action: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            tracing::info!("stdin is not a terminal; pass --yes to confirm non-interactively");
            return false;
        }

        let mut stderr = io::stderr();
        if write!(stderr, "{action} on '{subject}'? [y/N]: ")
            .and_then(|()| stderr.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .is_ok_and(|_| is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub(crate) async fn handle_apply_recovery_point(
    ctx: &AppContext,
    args: ApplyRecoveryPointArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let plane = Arc::new(HttpControlPlane::from_context(ctx)?);
    let orchestrator = Orchestrator::new(OrchestratorDeps {
        control_plane: plane.clone(),
        jobs: plane,
        certificates: Arc::new(FileCertificateLoader),
        confirmation: Arc::new(PromptConfirmation {
            assume_yes: args.yes,
        }),
        options: PayloadOptions {
            vault_location: args.vault_location,
        },
    });

    let request = RecoveryRequest {
        recovery_point: RecoveryPoint {
            id: args.recovery_point_id,
            protected_item_id: Some(args.protected_item_id.clone()),
        },
        protected_item: ReplicationProtectedItem {
            id: args.protected_item_id,
            name: args.protected_item_name,
            replication_provider: args.provider,
            friendly_name: args.friendly_name.unwrap_or_default(),
        },
        primary_kek_certificate: args.primary_kek_certificate,
        secondary_kek_certificate: args.secondary_kek_certificate,
    };

    if let Some(job) = orchestrator.apply_recovery_point(request).await? {
        render_job(&job, format)?;
    }
    Ok(())
}
