//! Command implementations for chainnet-dev CLI

pub mod check;
pub mod clusters;
pub mod config;
pub mod deploy;
pub mod images;
pub mod interactive;
pub mod manifests;
pub mod serve;

use std::sync::Arc;

use crate::config::Settings;
use crate::utils::{CommandRunner, Logger, ShellRunner};

/// Everything a command handler needs, built once in `main`
#[derive(Clone)]
pub struct Context {
    pub settings: Settings,
    pub runner: Arc<dyn CommandRunner>,
    pub log: Logger,
}

impl Context {
    pub fn new(settings: Settings, dry_run: bool) -> Self {
        let log = Logger::new("chainnet-dev");
        let shell_log = log.child("shell");
        let runner: Arc<dyn CommandRunner> = if dry_run {
            Arc::new(ShellRunner::dry_run(shell_log))
        } else {
            Arc::new(ShellRunner::new(shell_log))
        };

        Self {
            settings,
            runner,
            log,
        }
    }

    /// Context over an arbitrary runner
    pub fn with_runner(settings: Settings, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            settings,
            runner,
            log: Logger::new("chainnet-dev"),
        }
    }
}
