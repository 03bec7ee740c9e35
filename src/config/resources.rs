//! Deployable resources: images, clusters and manifests

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// What a deployment step should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Remove,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("type is incorrect: '{0}' (expected 'create' or 'remove')")]
pub struct InvalidAction(pub String);

impl Action {
    /// The kubectl verb for this action
    pub fn kubectl_verb(self) -> &'static str {
        match self {
            Action::Create => "apply",
            Action::Remove => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = InvalidAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "remove" => Ok(Action::Remove),
            other => Err(InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Remove => write!(f, "remove"),
        }
    }
}

/// Path flavour of an image source directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Linux,
    Windows,
}

impl TargetOs {
    pub fn host() -> Self {
        if cfg!(windows) {
            TargetOs::Windows
        } else {
            TargetOs::Linux
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetOs::Linux => write!(f, "linux"),
            TargetOs::Windows => write!(f, "windows"),
        }
    }
}

/// A node image built from a local source directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub name: String,
    pub path: String,
    pub system: TargetOs,

    #[serde(default = "default_tag")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

impl ImageSource {
    pub fn new(name: impl Into<String>, path: impl Into<String>, system: TargetOs) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            system,
            tag: default_tag(),
            build_args: BTreeMap::new(),
            dockerfile: None,
        }
    }

    /// `name:tag` reference
    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}

fn default_tag() -> String {
    "latest".to_string()
}

/// Which network participants a cluster hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterRole {
    Seed,
    Validator,
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterRole::Seed => write!(f, "seed"),
            ClusterRole::Validator => write!(f, "validator"),
        }
    }
}

/// A minikube profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    pub role: ClusterRole,
    pub cpus: String,
    pub memory: String,
    pub nodes: u32,
}

/// Kind of resource a manifest describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Deployment,
    Service,
    Configmap,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Deployment => write!(f, "deployment"),
            ResourceKind::Service => write!(f, "service"),
            ResourceKind::Configmap => write!(f, "configmap"),
        }
    }
}

/// A YAML manifest applied with kubectl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSpec {
    pub name: String,
    pub path: PathBuf,
    pub kind: ResourceKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ManifestSpec {
    pub fn new(name: &str, path: &str, kind: ResourceKind) -> Self {
        Self {
            name: name.to_string(),
            path: PathBuf::from(path),
            kind,
            namespace: None,
        }
    }
}

/// Node workloads deployed straight into their clusters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeManifests {
    #[serde(default = "default_seed_manifest")]
    pub seed: PathBuf,

    #[serde(default = "default_validator_manifest")]
    pub validator: PathBuf,

    #[serde(default = "default_validator_replicas")]
    pub validator_replicas: u32,
}

impl Default for NodeManifests {
    fn default() -> Self {
        Self {
            seed: default_seed_manifest(),
            validator: default_validator_manifest(),
            validator_replicas: default_validator_replicas(),
        }
    }
}

fn default_seed_manifest() -> PathBuf {
    PathBuf::from("deploy/nodes/seed-node.yaml")
}

fn default_validator_manifest() -> PathBuf {
    PathBuf::from("deploy/nodes/validator-node.yaml")
}

fn default_validator_replicas() -> u32 {
    3
}

pub(crate) fn default_images() -> Vec<ImageSource> {
    vec![
        ImageSource::new("seed-node-tripcode", "../seed-node-tripcode", TargetOs::host()),
        ImageSource::new(
            "validator-node-tripcode",
            "../validator-node-tripcode",
            TargetOs::host(),
        ),
    ]
}

pub(crate) fn default_clusters() -> Vec<ClusterSpec> {
    vec![
        ClusterSpec {
            name: "seed-cluster".to_string(),
            role: ClusterRole::Seed,
            cpus: "1".to_string(),
            memory: "2Gi".to_string(),
            nodes: 1,
        },
        ClusterSpec {
            name: "validator-cluster".to_string(),
            role: ClusterRole::Validator,
            cpus: "2".to_string(),
            memory: "4Gi".to_string(),
            nodes: 3,
        },
    ]
}

pub(crate) fn default_manifests() -> Vec<ManifestSpec> {
    vec![
        ManifestSpec::new(
            "seed-node-deployment",
            "deploy/seed/seed-node-deployment.yaml",
            ResourceKind::Deployment,
        ),
        ManifestSpec::new(
            "seed-node-service",
            "deploy/seed/seed-node-service.yaml",
            ResourceKind::Service,
        ),
        ManifestSpec::new(
            "validator-node-deployment",
            "deploy/validator/validator-node-deployment.yaml",
            ResourceKind::Deployment,
        ),
        ManifestSpec::new(
            "validator-node-service",
            "deploy/validator/validator-node-service.yaml",
            ResourceKind::Service,
        ),
        ManifestSpec::new(
            "redis-configmap",
            "deploy/redis/redis-configmap.yaml",
            ResourceKind::Configmap,
        ),
        ManifestSpec::new(
            "redis-service",
            "deploy/redis/redis-service.yaml",
            ResourceKind::Service,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_str() {
        assert_eq!(Action::from_str("create").unwrap(), Action::Create);
        assert_eq!(Action::from_str("remove").unwrap(), Action::Remove);

        let err = Action::from_str("update").unwrap_err();
        assert!(err.to_string().contains("type is incorrect"));
        assert!(Action::from_str("Create").is_err());
    }

    #[test]
    fn test_kubectl_verb() {
        assert_eq!(Action::Create.kubectl_verb(), "apply");
        assert_eq!(Action::Remove.kubectl_verb(), "delete");
    }

    #[test]
    fn test_image_reference() {
        let mut image = ImageSource::new("seed-node-tripcode", "/src/seed", TargetOs::Linux);
        assert_eq!(image.reference(), "seed-node-tripcode:latest");
        image.tag = "v2".to_string();
        assert_eq!(image.reference(), "seed-node-tripcode:v2");
    }

    #[test]
    fn test_default_manifest_order() {
        let names: Vec<String> = default_manifests().into_iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec![
                "seed-node-deployment",
                "seed-node-service",
                "validator-node-deployment",
                "validator-node-service",
                "redis-configmap",
                "redis-service",
            ]
        );
    }
}
