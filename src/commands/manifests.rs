//! Apply or delete the network manifests in the current context

use anyhow::{Result, bail};
use colored::Colorize;

use super::Context;
use crate::config::Action;
use crate::k8s::ManifestApplier;

/// Handle `manifests apply` and `manifests delete`
pub fn deploy(ctx: &Context, action: Action) -> Result<()> {
    let results = ManifestApplier::new(
        ctx.runner.as_ref(),
        &ctx.settings.manifests,
        ctx.log.child("manifests"),
    )
    .deploy(action)?;

    for result in &results {
        if result.success {
            println!(
                "  {} {} ({})",
                "✓".green(),
                result.resource,
                result.timestamp.format("%H:%M:%S")
            );
        } else {
            println!(
                "  {} {}: {}",
                "✗".red(),
                result.resource,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        bail!("kubectl {} failed for {} resource(s)", action.kubectl_verb(), failed);
    }

    Ok(())
}
