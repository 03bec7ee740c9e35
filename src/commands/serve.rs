//! Status API server, alone or alongside the interactive menu

use anyhow::{Context as _, Result};
use std::sync::Arc;

use super::Context;
use super::interactive::{MenuExit, show_menu};
use crate::k8s::KubeClusterApi;
use crate::server::Application;
use crate::status::StatusReader;

fn build_application(ctx: &Context) -> Result<Application> {
    let reader = StatusReader::new(Arc::new(KubeClusterApi::new()));
    Application::build(&ctx.settings.server, reader, ctx.log.child("server")).with_context(|| {
        format!(
            "Failed to bind status API on {}",
            ctx.settings.server.address()
        )
    })
}

/// Handle `serve`: run the status API until interrupted
pub fn serve(ctx: &Context) -> Result<()> {
    actix_web::rt::System::new().block_on(async {
        let app = build_application(ctx)?;
        app.run_until_stopped()
            .await
            .context("Status API server failed")
    })
}

/// Handle `run`: start the status API, then show the menu.
///
/// The server is stopped gracefully once the menu returns.
pub fn run(ctx: &Context) -> Result<MenuExit> {
    actix_web::rt::System::new().block_on(async {
        let app = build_application(ctx)?;
        let port = app.port();
        let handle = app.handle();
        let server = actix_web::rt::spawn(app.run_until_stopped());

        let menu_ctx = ctx.clone();
        let exit = tokio::task::spawn_blocking(move || show_menu(&menu_ctx, port))
            .await
            .context("Interactive menu panicked")?;

        ctx.log.info("Stopping status API...");
        handle.stop(true).await;
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => ctx.log.warn(format!("Status API stopped with error: {}", e)),
            Err(e) => ctx.log.warn(format!("Status API task failed: {}", e)),
        }

        Ok::<_, anyhow::Error>(exit)
    })
}
