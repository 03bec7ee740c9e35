//! Applying and deleting the network's Kubernetes manifests

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use super::kubectl;
use crate::config::{Action, ManifestSpec};
use crate::utils::{CommandError, CommandRunner, Logger};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cluster is not reachable: {0}")]
    ClusterUnreachable(#[source] CommandError),

    #[error("manifest file not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("failed to {action} {resource}: {source}")]
    ApplyFailed {
        resource: String,
        action: Action,
        #[source]
        source: CommandError,
    },
}

/// Outcome of one `kubectl apply|delete`
#[derive(Debug, Clone)]
pub struct DeploymentResult {
    pub resource: String,
    pub success: bool,
    pub action: Action,
    pub error: Option<String>,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

/// Applies the configured manifests in declared order
pub struct ManifestApplier<'a> {
    runner: &'a dyn CommandRunner,
    manifests: &'a [ManifestSpec],
    log: Logger,
}

impl<'a> ManifestApplier<'a> {
    pub fn new(runner: &'a dyn CommandRunner, manifests: &'a [ManifestSpec], log: Logger) -> Self {
        Self {
            runner,
            manifests,
            log,
        }
    }

    /// The current context must answer and every manifest must exist
    pub fn preflight(&self) -> Result<(), ManifestError> {
        kubectl::cluster_info(self.runner).map_err(ManifestError::ClusterUnreachable)?;

        for manifest in self.manifests {
            if !manifest.path.exists() {
                return Err(ManifestError::ManifestMissing(manifest.path.clone()));
            }
        }

        Ok(())
    }

    /// Apply (create) or delete (remove) every manifest.
    ///
    /// Create stops at the first failure and, if anything was already applied,
    /// runs one remove pass whose failures are only logged. Remove records
    /// failures and keeps going.
    pub fn deploy(&self, action: Action) -> Result<Vec<DeploymentResult>, ManifestError> {
        self.preflight()?;
        self.log.info(format!(
            "Running {} for {} resource(s)",
            action.kubectl_verb(),
            self.manifests.len()
        ));

        let mut results = Vec::with_capacity(self.manifests.len());

        for manifest in self.manifests {
            match self.run_one(action, manifest) {
                Ok(result) => results.push(result),
                Err((result, source)) => {
                    results.push(result);

                    if action == Action::Remove {
                        continue;
                    }

                    if results.iter().any(|r| r.success) {
                        self.rollback();
                    }

                    return Err(ManifestError::ApplyFailed {
                        resource: manifest.name.clone(),
                        action,
                        source,
                    });
                }
            }
        }

        let failed = results.iter().filter(|r| !r.success).count();
        if failed == 0 {
            self.log
                .info(format!("All resources processed ({})", action));
        } else {
            self.log.warn(format!(
                "{} of {} resource(s) failed during {}",
                failed,
                results.len(),
                action
            ));
        }

        Ok(results)
    }

    fn run_one(
        &self,
        action: Action,
        manifest: &ManifestSpec,
    ) -> Result<DeploymentResult, (DeploymentResult, CommandError)> {
        self.log.info(format!(
            "{} {} {}",
            action.kubectl_verb(),
            manifest.kind,
            manifest.name
        ));

        match kubectl::run_manifest(
            self.runner,
            action,
            &manifest.path,
            manifest.namespace.as_deref(),
        ) {
            Ok(output) => {
                self.log.output(&manifest.name, &output.stdout);
                Ok(DeploymentResult {
                    resource: manifest.name.clone(),
                    success: true,
                    action,
                    error: None,
                    output: output.stdout,
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                self.log
                    .error(format!("Failed to {} {}: {}", action, manifest.name, e));
                Err((
                    DeploymentResult {
                        resource: manifest.name.clone(),
                        success: false,
                        action,
                        error: Some(e.to_string()),
                        output: e.output.stdout.clone(),
                        timestamp: Utc::now(),
                    },
                    e,
                ))
            }
        }
    }

    /// One delete pass over every manifest; failures are swallowed
    fn rollback(&self) {
        self.log
            .warn("Rolling back applied resources after the failure");

        let failed = self
            .manifests
            .iter()
            .filter(|manifest| self.run_one(Action::Remove, manifest).is_err())
            .count();

        if failed > 0 {
            self.log
                .warn(format!("Rollback left {} resource(s) in place", failed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceKind;
    use crate::utils::shell::testing::RecordingRunner;
    use std::path::Path;

    const NAMES: [&str; 6] = [
        "seed-node-deployment",
        "seed-node-service",
        "validator-node-deployment",
        "validator-node-service",
        "redis-configmap",
        "redis-service",
    ];

    fn manifests(dir: &Path) -> Vec<ManifestSpec> {
        NAMES
            .iter()
            .map(|name| {
                let path = dir.join(format!("{}.yaml", name));
                std::fs::write(&path, "kind: Service\n").unwrap();
                ManifestSpec {
                    name: name.to_string(),
                    path,
                    kind: ResourceKind::Service,
                    namespace: None,
                }
            })
            .collect()
    }

    fn resource_of(call: &str) -> String {
        NAMES
            .iter()
            .find(|name| call.contains(&format!("{}.yaml", name)))
            .map(|name| name.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_create_applies_in_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests(dir.path());
        let runner = RecordingRunner::new();
        let applier = ManifestApplier::new(&runner, &manifests, Logger::new("test"));

        let results = applier.deploy(Action::Create).unwrap();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.success && r.action == Action::Create));

        let applied: Vec<String> = runner
            .calls_matching("kubectl apply")
            .iter()
            .map(|c| resource_of(c))
            .collect();
        assert_eq!(applied, NAMES);
        assert!(runner.calls_matching("kubectl delete").is_empty());
    }

    #[test]
    fn test_create_failure_stops_and_rolls_back_once() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests(dir.path());
        // Only the third resource fails to apply
        let runner = RecordingRunner::new().failing_on(&format!(
            "apply -f {}",
            manifests[2].path.display()
        ));
        let applier = ManifestApplier::new(&runner, &manifests, Logger::new("test"));

        let err = applier.deploy(Action::Create).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ApplyFailed { ref resource, .. } if resource == "validator-node-deployment"
        ));

        let applied: Vec<String> = runner
            .calls_matching("kubectl apply")
            .iter()
            .map(|c| resource_of(c))
            .collect();
        assert_eq!(applied, &NAMES[..3]);

        let deleted: Vec<String> = runner
            .calls_matching("kubectl delete")
            .iter()
            .map(|c| resource_of(c))
            .collect();
        assert_eq!(deleted, NAMES);
    }

    #[test]
    fn test_first_failure_skips_rollback() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests(dir.path());
        let runner = RecordingRunner::new().failing_on("kubectl apply");
        let applier = ManifestApplier::new(&runner, &manifests, Logger::new("test"));

        assert!(applier.deploy(Action::Create).is_err());
        assert_eq!(runner.calls_matching("kubectl apply").len(), 1);
        assert!(runner.calls_matching("kubectl delete").is_empty());
    }

    #[test]
    fn test_remove_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests(dir.path());
        let runner = RecordingRunner::new().failing_on("seed-node-service.yaml");
        let applier = ManifestApplier::new(&runner, &manifests, Logger::new("test"));

        let results = applier.deploy(Action::Remove).unwrap();
        assert_eq!(results.len(), 6);
        assert!(!results[1].success);
        assert!(results[1].error.is_some());
        assert_eq!(results.iter().filter(|r| r.success).count(), 5);
        assert_eq!(runner.calls_matching("kubectl delete").len(), 6);
    }

    #[test]
    fn test_preflight_errors_issue_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifests = manifests(dir.path());
        manifests[4].path = dir.path().join("missing.yaml");

        let runner = RecordingRunner::new();
        let applier = ManifestApplier::new(&runner, &manifests, Logger::new("test"));
        let err = applier.deploy(Action::Create).unwrap_err();
        assert!(err.to_string().contains("manifest file not found"));
        assert_eq!(runner.calls(), vec!["kubectl cluster-info"]);

        let runner = RecordingRunner::new().failing_on("cluster-info");
        let applier = ManifestApplier::new(&runner, &manifests, Logger::new("test"));
        let err = applier.deploy(Action::Remove).unwrap_err();
        assert!(matches!(err, ManifestError::ClusterUnreachable(_)));
        assert_eq!(runner.calls().len(), 1);
    }
}
