//! Prerequisite and preflight checks

use anyhow::{Result, bail};
use colored::Colorize;

use super::Context;
use crate::k8s::preflight::PreflightChecker;
use crate::utils::{CommonPrereqs, Prerequisite};

/// Handle `check`: tools on PATH, then the preflight checks
pub fn run(ctx: &Context) -> Result<()> {
    ctx.log.info("Checking prerequisites...");

    let tools = CommonPrereqs::all();
    let prereqs: Vec<&dyn Prerequisite> = tools.iter().map(|t| t as &dyn Prerequisite).collect();
    let (found, missing) = CommonPrereqs::check_all(&prereqs);

    for name in &found {
        println!("  {} {} found", "✓".green(), name);
    }
    for (name, hint) in &missing {
        println!("  {} {} not found ({})", "✗".red(), name, hint);
    }

    if !missing.is_empty() {
        bail!(
            "Missing required tools: {}",
            missing
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut checker = PreflightChecker::new(ctx.runner.as_ref());
    checker.run_all(&ctx.settings);
    if !checker.display_results() {
        bail!("Preflight checks failed");
    }

    Ok(())
}
