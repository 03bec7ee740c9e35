//! Image build and removal commands

use anyhow::{Result, bail};

use super::Context;
use crate::config::Action;
use crate::k8s::ImageBuilder;

/// Handle `images build` and `images remove`
pub fn manage(ctx: &Context, action: Action) -> Result<()> {
    let report = ImageBuilder::new(
        ctx.runner.as_ref(),
        &ctx.settings.images,
        ctx.log.child("images"),
    )
    .with_progress(ctx.settings.behavior.show_progress)
    .manage(action)?;

    println!("{}", report);
    for failure in report.failures() {
        println!(
            "  {}: {}",
            failure.image_name,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    if report.failed() > 0 {
        bail!("{} of {} image(s) failed", report.failed(), report.results.len());
    }

    Ok(())
}
