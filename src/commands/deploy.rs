//! Full network deployment: images, then clusters, then manifests

use anyhow::Result;
use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::Context;
use crate::config::{Action, InvalidAction, Settings};
use crate::k8s::{
    ClusterProvisioner, DeploymentResult, ImageBuilder, ImageError, ImageReport, ManifestApplier,
    ManifestError, ProvisionError, ProvisionReport,
};
use crate::utils::{CommandRunner, Logger};

#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    InvalidAction(#[from] InvalidAction),

    #[error(transparent)]
    Images(#[from] ImageError),

    #[error("{failed} image build(s) failed: {}", .names.join(", "))]
    ImagesFailed { failed: usize, names: Vec<String> },

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Manifests(#[from] ManifestError),
}

/// What each stage of a chain run did
#[derive(Debug, Clone)]
pub struct ChainReport {
    pub action: Action,
    pub images: ImageReport,
    pub clusters: ProvisionReport,
    pub resources: Vec<DeploymentResult>,
    /// Manifest removal was not attempted because every cluster was deleted
    pub resources_skipped: bool,
}

impl ChainReport {
    /// No stage recorded a failure
    pub fn is_clean(&self) -> bool {
        self.images.failed() == 0
            && self.clusters.is_clean()
            && self.resources.iter().all(|r| r.success)
    }
}

impl fmt::Display for ChainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.resources_skipped {
            return write!(
                f,
                "{}; {}; resources skipped (clusters deleted)",
                self.images, self.clusters
            );
        }

        let applied = self.resources.iter().filter(|r| r.success).count();
        write!(
            f,
            "{}; {}; {} resources: {} of {} succeeded",
            self.images,
            self.clusters,
            self.action,
            applied,
            self.resources.len()
        )
    }
}

/// Runs image builder, cluster provisioner and manifest applier in sequence
pub struct DeploymentChain<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
    log: Logger,
}

impl<'a> DeploymentChain<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a Settings, log: Logger) -> Self {
        Self {
            runner,
            settings,
            log,
        }
    }

    /// Parse `action` first; an unknown action runs nothing
    pub fn run_named(&self, action: &str) -> Result<ChainReport, ChainError> {
        let action: Action = action.parse()?;
        self.run(action)
    }

    /// Create aborts on the first failing stage. Remove tolerates per-image
    /// and per-cluster failures but still stops on validation errors. Once
    /// every cluster is gone there is nothing left to delete manifests from,
    /// so a complete teardown skips the manifest stage.
    pub fn run(&self, action: Action) -> Result<ChainReport, ChainError> {
        let show_progress = self.settings.behavior.show_progress;
        self.log.info(format!("Starting network {}", action));

        let images = ImageBuilder::new(
            self.runner,
            &self.settings.images,
            self.log.child("images"),
        )
        .with_progress(show_progress)
        .manage(action)?;

        if images.failed() > 0 {
            let names: Vec<String> = images.failures().map(|r| r.image_name.clone()).collect();
            if action == Action::Create {
                return Err(ChainError::ImagesFailed {
                    failed: names.len(),
                    names,
                });
            }
            self.log.warn(format!(
                "Continuing after image removal failures: {}",
                names.join(", ")
            ));
        }

        let clusters = ClusterProvisioner::new(
            self.runner,
            &self.settings.clusters,
            &self.settings.nodes,
            &self.settings.minikube.addons,
            self.log.child("clusters"),
        )
        .with_progress(show_progress)
        .setup(action)?;

        let teardown_complete = action == Action::Remove
            && !clusters.clusters.is_empty()
            && clusters.clusters.iter().all(|c| c.success);

        let resources = if teardown_complete {
            self.log
                .info("Every cluster was deleted, skipping manifest removal");
            Vec::new()
        } else {
            ManifestApplier::new(
                self.runner,
                &self.settings.manifests,
                self.log.child("manifests"),
            )
            .deploy(action)?
        };

        let report = ChainReport {
            action,
            images,
            clusters,
            resources,
            resources_skipped: teardown_complete,
        };

        if report.is_clean() {
            self.log.info(format!("Network {} finished: {}", action, report));
        } else {
            self.log
                .warn(format!("Network {} finished with failures: {}", action, report));
        }

        Ok(report)
    }
}

/// Handle `deploy` and `remove`
pub fn run(ctx: &Context, action: Action, yes: bool) -> Result<()> {
    if action == Action::Remove
        && ctx.settings.behavior.confirm_destructive
        && !yes
        && !crate::utils::confirm("Remove the whole network (images, clusters and resources)?")?
    {
        ctx.log.info("Removal cancelled");
        return Ok(());
    }

    let chain = DeploymentChain::new(ctx.runner.as_ref(), &ctx.settings, ctx.log.child("chain"));
    let report = chain.run(action)?;

    println!();
    if report.is_clean() {
        println!("{} {}", "✓".green(), report);
    } else {
        println!("{} {}", "⚠".yellow(), report);
    }

    Ok(())
}
