//! Minikube cluster provisioning and node workload deployment

use indicatif::ProgressBar;
use k8s_openapi::api::core::v1::{Node, Pod};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use super::kubectl;
use crate::config::{Action, ClusterRole, ClusterSpec, NodeManifests};
use crate::utils::progress::create_spinner;
use crate::utils::{CommandError, CommandRunner, Logger, command_line};

static REPLICAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"replicas: \d+").expect("valid replicas pattern"));

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("minikube is not available: {0}")]
    MinikubeUnavailable(#[source] CommandError),

    #[error("failed to create cluster {cluster}: {source}")]
    CreateFailed {
        cluster: String,
        #[source]
        source: CommandError,
    },

    #[error("no {0} cluster is configured")]
    MissingCluster(ClusterRole),

    #[error("manifest file not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("failed to {action} {role} node workload: {source}")]
    NodeDeploy {
        role: ClusterRole,
        action: Action,
        #[source]
        source: CommandError,
    },

    #[error("failed to prepare validator manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome for one minikube profile
#[derive(Debug, Clone)]
pub struct ClusterOutcome {
    pub name: String,
    pub success: bool,
    pub error: Option<String>,
}

/// What a provisioning pass did
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub action: Action,
    pub clusters: Vec<ClusterOutcome>,
    /// Node workload steps that failed during removal
    pub node_failures: Vec<String>,
}

impl ProvisionReport {
    fn new(action: Action) -> Self {
        Self {
            action,
            clusters: Vec::new(),
            node_failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.node_failures.is_empty() && self.clusters.iter().all(|c| c.success)
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ok = self.clusters.iter().filter(|c| c.success).count();
        write!(
            f,
            "{} clusters: {} of {} succeeded",
            self.action,
            ok,
            self.clusters.len()
        )?;
        if !self.node_failures.is_empty() {
            write!(f, ", {} node workload failure(s)", self.node_failures.len())?;
        }
        Ok(())
    }
}

/// Creates and deletes the minikube profiles hosting the network
pub struct ClusterProvisioner<'a> {
    runner: &'a dyn CommandRunner,
    clusters: &'a [ClusterSpec],
    nodes: &'a NodeManifests,
    addons: &'a [String],
    log: Logger,
    show_progress: bool,
}

impl<'a> ClusterProvisioner<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        clusters: &'a [ClusterSpec],
        nodes: &'a NodeManifests,
        addons: &'a [String],
        log: Logger,
    ) -> Self {
        Self {
            runner,
            clusters,
            nodes,
            addons,
            log,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Create or remove every configured cluster.
    ///
    /// A failed create is followed by a single best-effort removal pass before
    /// the original error is returned.
    pub fn setup(&self, action: Action) -> Result<ProvisionReport, ProvisionError> {
        self.log
            .info(format!("Starting '{}' for minikube clusters", action));

        let result = match action {
            Action::Create => self.create(),
            Action::Remove => self.remove(),
        };

        match result {
            Ok(report) => {
                if report.is_clean() {
                    self.log.info(&report);
                } else {
                    self.log.warn(&report);
                }
                Ok(report)
            }
            Err(e) if action == Action::Create => {
                self.log.error(format!("Cluster setup failed: {}", e));
                self.log
                    .info("Removing partially deployed resources after the failure...");
                match self.remove() {
                    Ok(report) => self.log.info(format!("Rollback finished: {}", report)),
                    Err(rollback) => self.log.warn(format!("Rollback failed: {}", rollback)),
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Check that minikube can be executed
    pub fn validate(&self) -> Result<(), ProvisionError> {
        self.runner
            .run("minikube version")
            .map(|_| ())
            .map_err(ProvisionError::MinikubeUnavailable)
    }

    fn create(&self) -> Result<ProvisionReport, ProvisionError> {
        self.validate()?;

        let mut report = ProvisionReport::new(Action::Create);
        for cluster in self.clusters {
            self.create_cluster(cluster)?;
            report.clusters.push(ClusterOutcome {
                name: cluster.name.clone(),
                success: true,
                error: None,
            });
        }

        let seed = self.deploy_seed_node(Action::Create);
        let validator = self.deploy_validator_nodes(Action::Create);
        seed?;
        validator?;

        Ok(report)
    }

    fn remove(&self) -> Result<ProvisionReport, ProvisionError> {
        self.validate()?;

        let mut report = ProvisionReport::new(Action::Remove);

        for (role, outcome) in [
            (ClusterRole::Seed, self.deploy_seed_node(Action::Remove)),
            (ClusterRole::Validator, self.deploy_validator_nodes(Action::Remove)),
        ] {
            if let Err(e) = outcome {
                self.log
                    .warn(format!("Could not remove {} node workload: {}", role, e));
                report.node_failures.push(e.to_string());
            }
        }

        for cluster in self.clusters {
            let outcome = match self.delete_cluster(&cluster.name) {
                Ok(()) => ClusterOutcome {
                    name: cluster.name.clone(),
                    success: true,
                    error: None,
                },
                Err(e) => {
                    self.log
                        .error(format!("Failed to delete cluster {}: {}", cluster.name, e));
                    ClusterOutcome {
                        name: cluster.name.clone(),
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.clusters.push(outcome);
        }

        Ok(report)
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if self.show_progress {
            create_spinner(&message)
        } else {
            ProgressBar::hidden()
        }
    }

    /// Start one profile and make it the current context
    pub fn create_cluster(&self, cluster: &ClusterSpec) -> Result<(), ProvisionError> {
        self.log.info(format!(
            "Creating cluster {} for {} nodes",
            cluster.name, cluster.role
        ));

        let pb = self.spinner(format!("Starting minikube profile {}", cluster.name));
        let started = self.runner.run(&start_command(cluster, self.addons));
        pb.finish_and_clear();

        let output = started.map_err(|source| ProvisionError::CreateFailed {
            cluster: cluster.name.clone(),
            source,
        })?;
        self.log.output(
            format!("Cluster {} created", cluster.name),
            &output.stdout,
        );

        kubectl::use_context(self.runner, &cluster.name).map_err(|source| {
            ProvisionError::CreateFailed {
                cluster: cluster.name.clone(),
                source,
            }
        })?;

        Ok(())
    }

    /// Delete one profile
    pub fn delete_cluster(&self, name: &str) -> Result<(), CommandError> {
        self.log.info(format!("Deleting cluster {}", name));

        let pb = self.spinner(format!("Deleting minikube profile {}", name));
        let deleted = self
            .runner
            .run(&command_line(["minikube", "delete", "--profile", name]));
        pb.finish_and_clear();

        let output = deleted?;
        self.log
            .output(format!("Cluster {} deleted", name), &output.stdout);
        Ok(())
    }

    fn context_for(&self, role: ClusterRole) -> Result<&str, ProvisionError> {
        self.clusters
            .iter()
            .find(|c| c.role == role)
            .map(|c| c.name.as_str())
            .ok_or(ProvisionError::MissingCluster(role))
    }

    /// Apply or delete the seed node workload in the seed cluster
    pub fn deploy_seed_node(&self, action: Action) -> Result<(), ProvisionError> {
        let context = self.context_for(ClusterRole::Seed)?;
        kubectl::use_context(self.runner, context)?;

        let manifest = existing(&self.nodes.seed)?;
        self.log.info(format!("Running {} on seed node", action));

        let output = kubectl::run_manifest(self.runner, action, manifest, None).map_err(
            |source| ProvisionError::NodeDeploy {
                role: ClusterRole::Seed,
                action,
                source,
            },
        )?;
        self.log.output("Seed node workload updated", &output.stdout);
        Ok(())
    }

    /// Apply or delete the validator workload with the configured replica count
    pub fn deploy_validator_nodes(&self, action: Action) -> Result<(), ProvisionError> {
        let context = self.context_for(ClusterRole::Validator)?;
        kubectl::use_context(self.runner, context)?;

        let manifest = existing(&self.nodes.validator)?;
        let count = self.nodes.validator_replicas;
        let content = with_replicas(&std::fs::read_to_string(manifest)?, count);

        // Removed from disk when dropped
        let mut patched = tempfile::Builder::new()
            .prefix("validator-node-")
            .suffix(".yaml")
            .tempfile()?;
        patched.write_all(content.as_bytes())?;
        patched.flush()?;

        self.log
            .info(format!("Running {} on {} validator nodes", action, count));

        let output = kubectl::run_manifest(self.runner, action, patched.path(), None).map_err(
            |source| ProvisionError::NodeDeploy {
                role: ClusterRole::Validator,
                action,
                source,
            },
        )?;
        self.log
            .output("Validator node workload updated", &output.stdout);
        Ok(())
    }

    /// Summarise every valid minikube profile, keyed by profile name
    pub fn cluster_status(&self) -> Result<BTreeMap<String, ClusterStatus>, ProvisionError> {
        let profiles = self.runner.run("minikube profile list -o json")?;
        let profiles: ProfileList =
            serde_json::from_str(&profiles.stdout).map_err(|source| ProvisionError::Parse {
                what: "minikube profile list",
                source,
            })?;

        let mut clusters = BTreeMap::new();
        for profile in profiles.valid {
            kubectl::use_context(self.runner, &profile.name)?;

            let nodes: ItemList<Node> =
                parse_items(&kubectl::get_json(self.runner, "nodes")?, "node list")?;
            let pods: ItemList<Pod> =
                parse_items(&kubectl::get_json(self.runner, "pods")?, "pod list")?;

            clusters.insert(
                profile.name,
                ClusterStatus::from_items(profile.status, nodes.items, pods.items),
            );
        }

        Ok(clusters)
    }
}

fn existing(path: &Path) -> Result<&Path, ProvisionError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ProvisionError::ManifestMissing(path.to_path_buf()))
    }
}

fn parse_items<T: for<'de> Deserialize<'de>>(
    json: &str,
    what: &'static str,
) -> Result<ItemList<T>, ProvisionError> {
    serde_json::from_str(json).map_err(|source| ProvisionError::Parse { what, source })
}

/// `minikube start` for one profile
pub fn start_command(cluster: &ClusterSpec, addons: &[String]) -> String {
    let mut args = vec![
        "minikube".to_string(),
        "start".to_string(),
        "--profile".to_string(),
        cluster.name.clone(),
        format!("--cpus={}", cluster.cpus),
        format!("--memory={}", cluster.memory),
        format!("--nodes={}", cluster.nodes),
    ];
    args.extend(addons.iter().map(|a| format!("--addons={}", a)));
    args.push(format!("--labels=role={}", cluster.role));

    command_line(args)
}

/// Replace the first `replicas: <n>` in a manifest
pub fn with_replicas(manifest: &str, count: u32) -> String {
    REPLICAS
        .replace(manifest, format!("replicas: {}", count).as_str())
        .into_owned()
}

#[derive(Debug, Deserialize)]
struct ProfileList {
    #[serde(default)]
    valid: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Status", default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Node and pod summary of one minikube profile
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub status: Option<String>,
    pub nodes: usize,
    pub node_details: Vec<ClusterNode>,
    pub pods: usize,
    pub pod_details: Vec<ClusterPod>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterNode {
    pub name: String,
    pub status: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterPod {
    pub name: String,
    pub status: Option<String>,
    pub node: Option<String>,
}

impl ClusterStatus {
    fn from_items(status: Option<String>, nodes: Vec<Node>, pods: Vec<Pod>) -> Self {
        let node_details: Vec<ClusterNode> = nodes
            .into_iter()
            .map(|node| {
                let ready = node
                    .status
                    .as_ref()
                    .and_then(|s| s.conditions.as_ref())
                    .and_then(|cs| cs.iter().find(|c| c.type_ == "Ready"))
                    .is_some_and(|c| c.status == "True");
                ClusterNode {
                    name: node.metadata.name.unwrap_or_default(),
                    status: if ready { "Ready" } else { "NotReady" }.to_string(),
                    labels: node.metadata.labels.unwrap_or_default(),
                }
            })
            .collect();

        let pod_details: Vec<ClusterPod> = pods
            .into_iter()
            .map(|pod| ClusterPod {
                name: pod.metadata.name.unwrap_or_default(),
                status: pod.status.and_then(|s| s.phase),
                node: pod.spec.and_then(|s| s.node_name),
            })
            .collect();

        Self {
            status,
            nodes: node_details.len(),
            node_details,
            pods: pod_details.len(),
            pod_details,
        }
    }
}
