//! Kubernetes operations

pub mod client;
pub mod images;
pub mod kubectl;
pub mod manifests;
pub mod minikube;
pub mod preflight;

pub use client::{
    ClusterApi, ContainerMetrics, K8sError, KubeClusterApi, METRICS_GROUP, NodeMetrics, PodMetrics,
};
pub use images::{BuildResult, ImageBuilder, ImageError, ImageReport};
pub use manifests::{DeploymentResult, ManifestApplier, ManifestError};
pub use minikube::{ClusterProvisioner, ProvisionError, ProvisionReport};
