//! Preflight validation checks before deployment

use colored::Colorize;
use serde::Deserialize;
use std::path::Path;

use super::kubectl;
use crate::config::Settings;
use crate::utils::CommandRunner;

/// Result of a preflight check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Pass(String),
    Warn(String),
    Fail(String),
}

impl CheckResult {
    pub fn is_error(&self) -> bool {
        matches!(self, CheckResult::Fail(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, CheckResult::Warn(_))
    }

    pub fn display(&self) {
        match self {
            CheckResult::Pass(msg) => {
                println!("  {} {}", "✓".green(), msg);
            }
            CheckResult::Warn(msg) => {
                println!("  {} {}", "⚠".yellow(), msg);
            }
            CheckResult::Fail(msg) => {
                println!("  {} {}", "✗".red(), msg);
            }
        }
    }
}

/// Preflight checker for the deployment tool chain and manifests
pub struct PreflightChecker<'a> {
    runner: &'a dyn CommandRunner,
    checks: Vec<CheckResult>,
}

impl<'a> PreflightChecker<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            checks: Vec::new(),
        }
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    /// Run all preflight checks
    pub fn run_all(&mut self, settings: &Settings) {
        self.check_docker_daemon();
        self.check_minikube();
        self.check_cluster_connection();
        self.check_node_count();

        self.check_manifest(&settings.nodes.seed);
        self.check_manifest(&settings.nodes.validator);
        for manifest in &settings.manifests {
            self.check_manifest(&manifest.path);
        }
    }

    /// Display results and return whether deployment should continue
    pub fn display_results(&self) -> bool {
        println!();

        let errors = self.checks.iter().filter(|c| c.is_error()).count();
        let warnings = self.checks.iter().filter(|c| c.is_warning()).count();

        for check in &self.checks {
            check.display();
        }

        println!();

        if errors > 0 {
            println!("{} error(s), {} warning(s)", errors, warnings);
            false
        } else if warnings > 0 {
            println!(
                "{} warning(s). Deployment may continue but proceed with caution.",
                warnings
            );
            true
        } else {
            println!("{}", "All checks passed!".green());
            true
        }
    }

    fn check_docker_daemon(&mut self) {
        let result = match self.runner.run("docker info") {
            Ok(_) => CheckResult::Pass("Docker daemon is reachable".to_string()),
            Err(_) => CheckResult::Fail("Docker daemon is not reachable".to_string()),
        };
        self.checks.push(result);
    }

    fn check_minikube(&mut self) {
        let result = match self.runner.run("minikube version --short") {
            Ok(out) if !out.stdout.is_empty() => {
                CheckResult::Pass(format!("minikube available: {}", out.stdout))
            }
            Ok(_) => CheckResult::Pass("minikube available".to_string()),
            Err(_) => CheckResult::Fail("minikube cannot be executed".to_string()),
        };
        self.checks.push(result);
    }

    /// Clusters are created by the deployment, so an unreachable one only warns
    fn check_cluster_connection(&mut self) {
        let result = match kubectl::cluster_info(self.runner) {
            Ok(_) => CheckResult::Pass("Cluster is reachable".to_string()),
            Err(_) => CheckResult::Warn(
                "Cannot connect to a cluster (it will be created on deploy)".to_string(),
            ),
        };
        self.checks.push(result);
    }

    fn check_node_count(&mut self) {
        let result = match self.runner.run("kubectl get nodes --no-headers") {
            Ok(output) => {
                let node_count = output.stdout.lines().filter(|l| !l.is_empty()).count();
                CheckResult::Pass(format!("Current context has {} node(s)", node_count))
            }
            Err(_) => CheckResult::Warn("Could not count cluster nodes".to_string()),
        };
        self.checks.push(result);
    }

    /// Check that a manifest exists and parses as YAML
    pub fn check_manifest(&mut self, path: &Path) {
        self.checks.push(check_manifest_file(path));
    }
}

fn check_manifest_file(path: &Path) -> CheckResult {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            return CheckResult::Fail(format!("Manifest not found: {}", path.display()));
        }
    };

    for document in serde_yaml::Deserializer::from_str(&contents) {
        if let Err(e) = serde_yaml::Value::deserialize(document) {
            return CheckResult::Fail(format!("Invalid YAML in {}: {}", path.display(), e));
        }
    }

    CheckResult::Pass(format!("Manifest {} is valid", path.display()))
}
