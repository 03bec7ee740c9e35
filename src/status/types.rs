//! Flattened, serialisable views of Kubernetes objects

use k8s_openapi::api::apps::v1::DeploymentStrategy;
use k8s_openapi::api::apps::v1::DeploymentCondition;
use k8s_openapi::api::core::v1::{
    ContainerPort, EnvVar, EventSource, LoadBalancerStatus, NodeAddress, NodeCondition,
    NodeSystemInfo, PodCondition, ResourceRequirements, Taint, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, Time};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use std::collections::BTreeMap;

pub type Labels = Option<BTreeMap<String, String>>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PodSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodDetails {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
    pub node_name: Option<String>,
    #[serde(rename = "hostIP")]
    pub host_ip: Option<String>,
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
    pub start_time: Option<Time>,
    pub containers: Vec<ContainerInfo>,
    pub conditions: Option<Vec<PodCondition>>,
    pub volumes: Option<Vec<Volume>>,
    pub labels: Labels,
    pub annotations: Labels,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub name: String,
    pub image: Option<String>,
    pub ports: Option<Vec<PortInfo>>,
    pub resources: Option<ResourceRequirements>,
    pub readiness_probe: bool,
    pub liveness_probe: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortInfo {
    pub container_port: i32,
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: Option<String>,
    pub ports: Option<Vec<ServicePortSummary>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortSummary {
    pub port: i32,
    pub target_port: Option<IntOrString>,
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetails {
    pub name: Option<String>,
    pub namespace: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: Option<String>,
    #[serde(rename = "externalIPs")]
    pub external_ips: Option<Vec<String>>,
    #[serde(rename = "loadBalancerIP")]
    pub load_balancer_ip: Option<String>,
    pub external_name: Option<String>,
    pub ports: Option<Vec<ServicePortDetail>>,
    pub selector: Labels,
    pub session_affinity: Option<String>,
    pub load_balancer_status: Option<LoadBalancerStatus>,
    pub labels: Labels,
    pub annotations: Labels,
    pub creation_timestamp: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortDetail {
    pub name: Option<String>,
    pub protocol: Option<String>,
    pub port: i32,
    pub target_port: Option<IntOrString>,
    pub node_port: Option<i32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub replicas: Option<i32>,
    pub available_replicas: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDetails {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub replicas: Option<i32>,
    pub strategy: Option<DeploymentStrategy>,
    pub selector: Option<LabelSelector>,
    pub template: TemplateInfo,
    pub status: DeploymentStatusInfo,
    pub labels: Labels,
    pub annotations: Labels,
    pub creation_timestamp: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub labels: Labels,
    pub containers: Option<Vec<TemplateContainer>>,
    pub volumes: Option<Vec<Volume>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContainer {
    pub name: String,
    pub image: Option<String>,
    pub ports: Option<Vec<ContainerPort>>,
    pub env: Option<Vec<EnvVar>>,
    pub resources: Option<ResourceRequirements>,
    pub volume_mounts: Option<Vec<VolumeMount>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatusInfo {
    pub available_replicas: Option<i32>,
    pub ready_replicas: Option<i32>,
    pub updated_replicas: Option<i32>,
    pub unavailable_replicas: Option<i32>,
    pub conditions: Option<Vec<DeploymentCondition>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub name: Option<String>,
    /// `Ready` or `NotReady`
    pub status: String,
    pub roles: Vec<String>,
    pub kubelet_version: Option<String>,
    pub os_image: Option<String>,
    pub kernel_version: Option<String>,
    pub architecture: Option<String>,
    pub capacity: NodeResources,
    pub allocatable: NodeResources,
    pub addresses: Option<Vec<AddressInfo>>,
    pub taints: Option<Vec<Taint>>,
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NodeResources {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub pods: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AddressInfo {
    #[serde(rename = "type")]
    pub address_type: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    pub name: Option<String>,
    pub labels: Labels,
    pub annotations: Labels,
    pub creation_timestamp: Option<Time>,
    pub conditions: Option<Vec<NodeCondition>>,
    pub addresses: Option<Vec<NodeAddress>>,
    pub capacity: Option<BTreeMap<String, Quantity>>,
    pub allocatable: Option<BTreeMap<String, Quantity>>,
    pub system_info: Option<NodeSystemInfo>,
    pub taints: Option<Vec<Taint>>,
    pub unschedulable: Option<bool>,
    pub pods_running: Vec<NodePod>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePod {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
    pub start_time: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    pub name: Option<String>,
    pub status: Option<String>,
    pub labels: Labels,
    pub creation_timestamp: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceResources {
    pub namespace: String,
    pub resource_counts: ResourceCounts,
    pub pods: Vec<NamespacePod>,
    pub services: Vec<NamespaceService>,
    pub deployments: Vec<NamespaceDeployment>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCounts {
    pub pods: usize,
    pub services: usize,
    pub deployments: usize,
    pub config_maps: usize,
    pub secrets: usize,
    pub persistent_volume_claims: usize,
    pub ingresses: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NamespacePod {
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NamespaceService {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NamespaceDeployment {
    pub name: Option<String>,
    /// `ready/desired`
    pub replicas: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PvcSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
    pub storage_class_name: Option<String>,
    pub access_modes: Option<Vec<String>>,
    pub storage: Option<String>,
    pub volume_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngressSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub hosts: Option<Vec<Option<String>>>,
    pub tls: Option<Vec<IngressTlsInfo>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressTlsInfo {
    pub hosts: Option<Vec<String>>,
    pub secret_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub data_keys: Vec<String>,
    pub creation_timestamp: Option<Time>,
}

/// Secret metadata; values are never exposed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSummary {
    pub name: Option<String>,
    pub namespace: Option<String>,
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
    pub data_keys: Vec<String>,
    pub creation_timestamp: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub involved_object: InvolvedObject,
    pub count: Option<i32>,
    pub first_timestamp: Option<Time>,
    pub last_timestamp: Option<Time>,
    pub source: Option<EventSource>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvolvedObject {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub health: Health,
    pub counts: ClusterCounts,
    pub capacity: ClusterCapacity,
    pub top_namespaces: Vec<NamespacePodCount>,
}

/// `ready/total` ratios
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Health {
    pub nodes: String,
    pub pods: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCounts {
    pub nodes: usize,
    pub namespaces: usize,
    pub pods: usize,
    pub deployments: usize,
    pub services: usize,
    pub persistent_volume_claims: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCapacity {
    pub cpu: i64,
    pub memory_gi: f64,
    pub pods: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamespacePodCount {
    pub name: Option<String>,
    pub pod_count: usize,
}

/// Live usage reported by metrics-server
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceUsage {
    pub nodes: Vec<NodeUsage>,
    pub pods: Vec<PodUsage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NodeUsage {
    pub name: Option<String>,
    pub usage: BTreeMap<String, String>,
    pub window: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PodUsage {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub containers: Vec<ContainerUsage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContainerUsage {
    pub name: String,
    pub usage: BTreeMap<String, String>,
}
