//! Minikube cluster commands

use anyhow::{Context as _, Result};

use super::Context;
use crate::config::Action;
use crate::k8s::ClusterProvisioner;
use crate::utils::progress::with_spinner_result;

fn provisioner(ctx: &Context) -> ClusterProvisioner<'_> {
    ClusterProvisioner::new(
        ctx.runner.as_ref(),
        &ctx.settings.clusters,
        &ctx.settings.nodes,
        &ctx.settings.minikube.addons,
        ctx.log.child("clusters"),
    )
    .with_progress(ctx.settings.behavior.show_progress)
}

/// Handle `clusters create`
pub fn create(ctx: &Context) -> Result<()> {
    let report = provisioner(ctx).setup(Action::Create)?;
    println!("{}", report);
    Ok(())
}

/// Handle `clusters delete`
pub fn delete(ctx: &Context, yes: bool) -> Result<()> {
    let names: Vec<&str> = ctx.settings.clusters.iter().map(|c| c.name.as_str()).collect();

    if ctx.settings.behavior.confirm_destructive
        && !yes
        && !crate::utils::confirm(&format!(
            "Are you sure you want to delete cluster(s) {}?",
            names.join(", ")
        ))?
    {
        ctx.log.info("Deletion cancelled");
        return Ok(());
    }

    let report = provisioner(ctx).setup(Action::Remove)?;
    println!("{}", report);
    for cluster in report.clusters.iter().filter(|c| !c.success) {
        println!(
            "  {}: {}",
            cluster.name,
            cluster.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Handle `clusters status`: one JSON object keyed by profile
pub fn status(ctx: &Context) -> Result<()> {
    let provisioner = provisioner(ctx);
    let clusters = if ctx.settings.behavior.show_progress {
        with_spinner_result("Querying minikube profiles...", "Cluster status collected", || {
            provisioner.cluster_status()
        })?
    } else {
        provisioner.cluster_status()?
    };
    let json =
        serde_json::to_string_pretty(&clusters).context("Failed to serialize cluster status")?;
    println!("{}", json);
    Ok(())
}
