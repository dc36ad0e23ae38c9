//! Health command handler.

use gaggiuino_core::{Coordinator, CoordinatorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Probe `/api/health` without a full refresh. Unhealthy exits non-zero.
pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let url = config.host.to_string();
    let coordinator = Coordinator::new(config)?;
    let healthy = coordinator.check_health().await;
    coordinator.shutdown().await;

    if !healthy {
        return Err(CliError::Unhealthy { url });
    }
    let out = output::render_single(
        &global.output,
        &serde_json::json!({ "host": url, "healthy": true }),
        |_| format!("{url}: healthy"),
        |_| "healthy".into(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
