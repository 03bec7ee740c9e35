//! Read-only status views over the Kubernetes API
//!
//! Every accessor re-queries the API through a [`ClusterApi`] and flattens the
//! returned objects into the records in [`types`]. Nothing is cached.

pub mod types;

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::k8s::{ClusterApi, K8sError, NodeMetrics, PodMetrics};
use types::*;

/// Events returned by [`StatusReader::events`]
pub const MAX_EVENTS: usize = 100;

const TOP_NAMESPACES: usize = 5;
const NODE_ROLE_PREFIX: &str = "node-role.kubernetes.io/";

/// A failed status read, naming the operation that failed
#[derive(Debug, Error)]
#[error("failed to {operation}: {source}")]
pub struct StatusError {
    pub operation: String,
    #[source]
    pub source: K8sError,
}

fn failed(operation: impl Into<String>) -> impl FnOnce(K8sError) -> StatusError {
    let operation = operation.into();
    move |source| StatusError { operation, source }
}

#[derive(Clone)]
pub struct StatusReader {
    api: Arc<dyn ClusterApi>,
}

impl StatusReader {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self { api }
    }

    pub async fn pods(&self) -> Result<Vec<PodSummary>, StatusError> {
        let pods = self
            .api
            .list_pods(None, None)
            .await
            .map_err(failed("fetch pods from Kubernetes"))?;

        Ok(pods.into_iter().map(pod_summary).collect())
    }

    pub async fn pod_details(&self, namespace: &str, name: &str) -> Result<PodDetails, StatusError> {
        let pod = self
            .api
            .get_pod(namespace, name)
            .await
            .map_err(failed(format!("fetch details of pod {}", name)))?;

        let status = pod.status.unwrap_or_default();
        let spec = pod.spec.unwrap_or_default();

        Ok(PodDetails {
            name: pod.metadata.name,
            namespace: pod.metadata.namespace,
            status: status.phase,
            node_name: spec.node_name,
            host_ip: status.host_ip,
            pod_ip: status.pod_ip,
            start_time: status.start_time,
            containers: spec
                .containers
                .into_iter()
                .map(|c| ContainerInfo {
                    name: c.name,
                    image: c.image,
                    ports: c.ports.map(|ports| {
                        ports
                            .into_iter()
                            .map(|p| PortInfo {
                                container_port: p.container_port,
                                protocol: p.protocol,
                            })
                            .collect()
                    }),
                    resources: c.resources,
                    readiness_probe: c.readiness_probe.is_some(),
                    liveness_probe: c.liveness_probe.is_some(),
                })
                .collect(),
            conditions: status.conditions,
            volumes: spec.volumes,
            labels: pod.metadata.labels,
            annotations: pod.metadata.annotations,
        })
    }

    pub async fn services(&self) -> Result<Vec<ServiceSummary>, StatusError> {
        let services = self
            .api
            .list_services(None)
            .await
            .map_err(failed("fetch services from Kubernetes"))?;

        Ok(services.into_iter().map(service_summary).collect())
    }

    pub async fn service_details(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ServiceDetails, StatusError> {
        let service = self
            .api
            .get_service(namespace, name)
            .await
            .map_err(failed(format!("fetch details of service {}", name)))?;

        let spec = service.spec.unwrap_or_default();
        Ok(ServiceDetails {
            name: service.metadata.name,
            namespace: service.metadata.namespace,
            service_type: spec.type_,
            cluster_ip: spec.cluster_ip,
            external_ips: spec.external_ips,
            load_balancer_ip: spec.load_balancer_ip,
            external_name: spec.external_name,
            ports: spec.ports.map(|ports| {
                ports
                    .into_iter()
                    .map(|p| ServicePortDetail {
                        name: p.name,
                        protocol: p.protocol,
                        port: p.port,
                        target_port: p.target_port,
                        node_port: p.node_port,
                    })
                    .collect()
            }),
            selector: spec.selector,
            session_affinity: spec.session_affinity,
            load_balancer_status: service.status.and_then(|s| s.load_balancer),
            labels: service.metadata.labels,
            annotations: service.metadata.annotations,
            creation_timestamp: service.metadata.creation_timestamp,
        })
    }

    pub async fn deployments(&self) -> Result<Vec<DeploymentSummary>, StatusError> {
        let deployments = self
            .api
            .list_deployments(None)
            .await
            .map_err(failed("fetch deployments from Kubernetes"))?;

        Ok(deployments.into_iter().map(deployment_summary).collect())
    }

    pub async fn deployment_details(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<DeploymentDetails, StatusError> {
        let deployment = self
            .api
            .get_deployment(namespace, name)
            .await
            .map_err(failed(format!("fetch details of deployment {}", name)))?;

        let status = deployment.status.unwrap_or_default();
        let (replicas, strategy, selector, template) = match deployment.spec {
            Some(spec) => (
                spec.replicas,
                spec.strategy,
                Some(spec.selector),
                Some(spec.template),
            ),
            None => (None, None, None, None),
        };
        let (template_labels, pod_spec) = match template {
            Some(t) => (t.metadata.and_then(|m| m.labels), t.spec),
            None => (None, None),
        };
        let (containers, volumes) = match pod_spec {
            Some(spec) => (
                Some(
                    spec.containers
                        .into_iter()
                        .map(|c| TemplateContainer {
                            name: c.name,
                            image: c.image,
                            ports: c.ports,
                            env: c.env,
                            resources: c.resources,
                            volume_mounts: c.volume_mounts,
                        })
                        .collect(),
                ),
                spec.volumes,
            ),
            None => (None, None),
        };

        Ok(DeploymentDetails {
            name: deployment.metadata.name,
            namespace: deployment.metadata.namespace,
            replicas,
            strategy,
            selector,
            template: TemplateInfo {
                labels: template_labels,
                containers,
                volumes,
            },
            status: DeploymentStatusInfo {
                available_replicas: status.available_replicas,
                ready_replicas: status.ready_replicas,
                updated_replicas: status.updated_replicas,
                unavailable_replicas: status.unavailable_replicas,
                conditions: status.conditions,
            },
            labels: deployment.metadata.labels,
            annotations: deployment.metadata.annotations,
            creation_timestamp: deployment.metadata.creation_timestamp,
        })
    }

    pub async fn nodes(&self) -> Result<Vec<NodeSummary>, StatusError> {
        let nodes = self
            .api
            .list_nodes()
            .await
            .map_err(failed("fetch nodes from Kubernetes"))?;

        Ok(nodes.into_iter().map(node_summary).collect())
    }

    /// A node's raw status blocks plus the pods scheduled on it
    pub async fn node_details(&self, name: &str) -> Result<NodeDetails, StatusError> {
        let operation = format!("fetch details of node {}", name);
        let selector = format!("spec.nodeName={}", name);

        let (node, pods) = futures::try_join!(
            self.api.get_node(name),
            self.api.list_pods(None, Some(&selector)),
        )
        .map_err(failed(operation))?;

        let status = node.status.unwrap_or_default();
        let spec = node.spec.unwrap_or_default();

        Ok(NodeDetails {
            name: node.metadata.name,
            labels: node.metadata.labels,
            annotations: node.metadata.annotations,
            creation_timestamp: node.metadata.creation_timestamp,
            conditions: status.conditions,
            addresses: status.addresses,
            capacity: status.capacity,
            allocatable: status.allocatable,
            system_info: status.node_info,
            taints: spec.taints,
            unschedulable: spec.unschedulable,
            pods_running: pods
                .into_iter()
                .map(|pod| {
                    let status = pod.status.unwrap_or_default();
                    NodePod {
                        name: pod.metadata.name,
                        namespace: pod.metadata.namespace,
                        status: status.phase,
                        start_time: status.start_time,
                    }
                })
                .collect(),
        })
    }

    pub async fn namespaces(&self) -> Result<Vec<NamespaceSummary>, StatusError> {
        let namespaces = self
            .api
            .list_namespaces()
            .await
            .map_err(failed("fetch namespaces from Kubernetes"))?;

        Ok(namespaces
            .into_iter()
            .map(|ns| NamespaceSummary {
                name: ns.metadata.name,
                status: ns.status.and_then(|s| s.phase),
                labels: ns.metadata.labels,
                creation_timestamp: ns.metadata.creation_timestamp,
            })
            .collect())
    }

    /// Counts of seven resource kinds in a namespace, fetched concurrently
    pub async fn namespace_resources(
        &self,
        namespace: &str,
    ) -> Result<NamespaceResources, StatusError> {
        let ns = Some(namespace);
        let (pods, services, deployments, config_maps, secrets, pvcs, ingresses) = futures::try_join!(
            self.api.list_pods(ns, None),
            self.api.list_services(ns),
            self.api.list_deployments(ns),
            self.api.list_config_maps(ns),
            self.api.list_secrets(ns),
            self.api.list_pvcs(ns),
            self.api.list_ingresses(ns),
        )
        .map_err(failed(format!("fetch resources of namespace {}", namespace)))?;

        Ok(NamespaceResources {
            namespace: namespace.to_string(),
            resource_counts: ResourceCounts {
                pods: pods.len(),
                services: services.len(),
                deployments: deployments.len(),
                config_maps: config_maps.len(),
                secrets: secrets.len(),
                persistent_volume_claims: pvcs.len(),
                ingresses: ingresses.len(),
            },
            pods: pods
                .into_iter()
                .map(|pod| NamespacePod {
                    name: pod.metadata.name,
                    status: pod.status.and_then(|s| s.phase),
                })
                .collect(),
            services: services
                .into_iter()
                .map(|svc| {
                    let spec = svc.spec.unwrap_or_default();
                    NamespaceService {
                        name: svc.metadata.name,
                        service_type: spec.type_,
                        cluster_ip: spec.cluster_ip,
                    }
                })
                .collect(),
            deployments: deployments
                .into_iter()
                .map(|d| {
                    let ready = d.status.and_then(|s| s.ready_replicas).unwrap_or(0);
                    // The API server defaults an unset replica count to 1
                    let desired = d.spec.and_then(|s| s.replicas).unwrap_or(1);
                    NamespaceDeployment {
                        name: d.metadata.name,
                        replicas: format!("{}/{}", ready, desired),
                    }
                })
                .collect(),
        })
    }

    pub async fn persistent_volume_claims(&self) -> Result<Vec<PvcSummary>, StatusError> {
        let pvcs = self
            .api
            .list_pvcs(None)
            .await
            .map_err(failed("fetch persistent volume claims from Kubernetes"))?;

        Ok(pvcs
            .into_iter()
            .map(|pvc| {
                let spec = pvc.spec.unwrap_or_default();
                PvcSummary {
                    name: pvc.metadata.name,
                    namespace: pvc.metadata.namespace,
                    status: pvc.status.and_then(|s| s.phase),
                    storage_class_name: spec.storage_class_name,
                    access_modes: spec.access_modes,
                    storage: spec
                        .resources
                        .and_then(|r| r.requests)
                        .and_then(|mut requests| requests.remove("storage"))
                        .map(|q| q.0),
                    volume_name: spec.volume_name,
                }
            })
            .collect())
    }

    pub async fn ingresses(&self) -> Result<Vec<IngressSummary>, StatusError> {
        let ingresses = self
            .api
            .list_ingresses(None)
            .await
            .map_err(failed("fetch ingresses from Kubernetes"))?;

        Ok(ingresses
            .into_iter()
            .map(|ingress| {
                let spec = ingress.spec.unwrap_or_default();
                IngressSummary {
                    name: ingress.metadata.name,
                    namespace: ingress.metadata.namespace,
                    hosts: spec
                        .rules
                        .map(|rules| rules.into_iter().map(|r| r.host).collect()),
                    tls: spec.tls.map(|tls| {
                        tls.into_iter()
                            .map(|t| IngressTlsInfo {
                                hosts: t.hosts,
                                secret_name: t.secret_name,
                            })
                            .collect()
                    }),
                }
            })
            .collect())
    }

    pub async fn config_maps(&self) -> Result<Vec<ConfigMapSummary>, StatusError> {
        let config_maps = self
            .api
            .list_config_maps(None)
            .await
            .map_err(failed("fetch configmaps from Kubernetes"))?;

        Ok(config_maps
            .into_iter()
            .map(|cm| ConfigMapSummary {
                name: cm.metadata.name,
                namespace: cm.metadata.namespace,
                data_keys: cm.data.map(|d| d.into_keys().collect()).unwrap_or_default(),
                creation_timestamp: cm.metadata.creation_timestamp,
            })
            .collect())
    }

    /// Secret metadata and key names only
    pub async fn secrets(&self) -> Result<Vec<SecretSummary>, StatusError> {
        let secrets = self
            .api
            .list_secrets(None)
            .await
            .map_err(failed("fetch secrets from Kubernetes"))?;

        Ok(secrets
            .into_iter()
            .map(|secret| SecretSummary {
                name: secret.metadata.name,
                namespace: secret.metadata.namespace,
                secret_type: secret.type_,
                data_keys: secret
                    .data
                    .map(|d| d.into_keys().collect())
                    .unwrap_or_default(),
                creation_timestamp: secret.metadata.creation_timestamp,
            })
            .collect())
    }

    /// Newest events first, at most [`MAX_EVENTS`]
    pub async fn events(&self, namespace: Option<&str>) -> Result<Vec<EventSummary>, StatusError> {
        let mut events = self
            .api
            .list_events(namespace)
            .await
            .map_err(failed("fetch cluster events"))?;

        // Events without any timestamp sort last
        events.sort_by_cached_key(|e| std::cmp::Reverse(event_time(e)));
        events.truncate(MAX_EVENTS);

        Ok(events
            .into_iter()
            .map(|e| EventSummary {
                event_type: e.type_,
                reason: e.reason,
                message: e.message,
                involved_object: InvolvedObject {
                    kind: e.involved_object.kind,
                    name: e.involved_object.name,
                    namespace: e.involved_object.namespace,
                },
                count: e.count,
                first_timestamp: e.first_timestamp,
                last_timestamp: e.last_timestamp,
                source: e.source,
            })
            .collect())
    }

    /// Health ratios, counts, total capacity and the busiest namespaces
    pub async fn cluster_summary(&self) -> Result<ClusterSummary, StatusError> {
        let (nodes, namespaces, pods, deployments, services, pvcs) = futures::try_join!(
            self.nodes(),
            self.namespaces(),
            self.pods(),
            self.deployments(),
            self.services(),
            self.persistent_volume_claims(),
        )?;

        let ready_nodes = nodes.iter().filter(|n| n.status == "Ready").count();
        let running_pods = pods
            .iter()
            .filter(|p| p.status.as_deref() == Some("Running"))
            .count();

        let mut cpu = 0;
        let mut memory_ki = 0;
        let mut pod_capacity = 0;
        for node in &nodes {
            cpu += leading_int(node.capacity.cpu.as_deref());
            memory_ki += leading_int(
                node.capacity
                    .memory
                    .as_deref()
                    .map(|m| m.trim_end_matches("Ki")),
            );
            pod_capacity += leading_int(node.capacity.pods.as_deref());
        }
        let memory_gi = memory_ki as f64 / (1024.0 * 1024.0);

        let mut top_namespaces: Vec<NamespacePodCount> = namespaces
            .iter()
            .map(|ns| NamespacePodCount {
                name: ns.name.clone(),
                pod_count: pods.iter().filter(|p| p.namespace == ns.name).count(),
            })
            .collect();
        top_namespaces.sort_by(|a, b| b.pod_count.cmp(&a.pod_count));
        top_namespaces.truncate(TOP_NAMESPACES);

        Ok(ClusterSummary {
            health: Health {
                nodes: format!("{}/{}", ready_nodes, nodes.len()),
                pods: format!("{}/{}", running_pods, pods.len()),
            },
            counts: ClusterCounts {
                nodes: nodes.len(),
                namespaces: namespaces.len(),
                pods: pods.len(),
                deployments: deployments.len(),
                services: services.len(),
                persistent_volume_claims: pvcs.len(),
            },
            capacity: ClusterCapacity {
                cpu,
                memory_gi: (memory_gi * 100.0).round() / 100.0,
                pods: pod_capacity,
            },
            top_namespaces,
        })
    }

    /// Node and container usage from metrics-server.
    ///
    /// `None` when the cluster does not serve the metrics API.
    pub async fn resource_usage(&self) -> Result<Option<ResourceUsage>, StatusError> {
        let available = self
            .api
            .metrics_available()
            .await
            .map_err(failed("discover the metrics API"))?;
        if !available {
            return Ok(None);
        }

        let (nodes, pods) = futures::try_join!(
            self.api.list_node_metrics(),
            self.api.list_pod_metrics(),
        )
        .map_err(failed("fetch resource usage metrics"))?;

        Ok(Some(ResourceUsage {
            nodes: nodes.into_iter().map(node_usage).collect(),
            pods: pods.into_iter().map(pod_usage).collect(),
        }))
    }
}

fn node_usage(metrics: NodeMetrics) -> NodeUsage {
    NodeUsage {
        name: metrics.metadata.name,
        usage: quantities(metrics.usage),
        window: metrics.window,
    }
}

fn pod_usage(metrics: PodMetrics) -> PodUsage {
    PodUsage {
        name: metrics.metadata.name,
        namespace: metrics.metadata.namespace,
        containers: metrics
            .containers
            .into_iter()
            .map(|c| ContainerUsage {
                name: c.name,
                usage: quantities(c.usage),
            })
            .collect(),
    }
}

fn quantities(map: BTreeMap<String, Quantity>) -> BTreeMap<String, String> {
    map.into_iter().map(|(k, q)| (k, q.0)).collect()
}

fn pod_summary(pod: Pod) -> PodSummary {
    PodSummary {
        name: pod.metadata.name,
        namespace: pod.metadata.namespace,
        status: pod.status.and_then(|s| s.phase),
    }
}

fn service_summary(service: Service) -> ServiceSummary {
    let spec = service.spec.unwrap_or_default();
    ServiceSummary {
        name: service.metadata.name,
        namespace: service.metadata.namespace,
        service_type: spec.type_,
        cluster_ip: spec.cluster_ip,
        ports: spec.ports.map(|ports| {
            ports
                .into_iter()
                .map(|p| ServicePortSummary {
                    port: p.port,
                    target_port: p.target_port,
                    protocol: p.protocol,
                })
                .collect()
        }),
    }
}

fn deployment_summary(deployment: Deployment) -> DeploymentSummary {
    DeploymentSummary {
        name: deployment.metadata.name,
        namespace: deployment.metadata.namespace,
        replicas: deployment.spec.and_then(|s| s.replicas),
        available_replicas: deployment.status.and_then(|s| s.available_replicas),
    }
}

fn node_summary(node: Node) -> NodeSummary {
    let status = node.status.unwrap_or_default();
    let ready = status
        .conditions
        .as_ref()
        .and_then(|cs| cs.iter().find(|c| c.type_ == "Ready"))
        .is_some_and(|c| c.status == "True");

    let roles = node
        .metadata
        .labels
        .as_ref()
        .map(|labels| {
            labels
                .keys()
                .filter_map(|key| key.strip_prefix(NODE_ROLE_PREFIX))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let info = status.node_info;

    NodeSummary {
        name: node.metadata.name,
        status: if ready { "Ready" } else { "NotReady" }.to_string(),
        roles,
        kubelet_version: info.as_ref().map(|i| i.kubelet_version.clone()),
        os_image: info.as_ref().map(|i| i.os_image.clone()),
        kernel_version: info.as_ref().map(|i| i.kernel_version.clone()),
        architecture: info.as_ref().map(|i| i.architecture.clone()),
        capacity: node_resources(status.capacity.as_ref()),
        allocatable: node_resources(status.allocatable.as_ref()),
        addresses: status.addresses.map(|addrs| {
            addrs
                .into_iter()
                .map(|a| AddressInfo {
                    address_type: a.type_,
                    address: a.address,
                })
                .collect()
        }),
        taints: node.spec.and_then(|s| s.taints),
        labels: node.metadata.labels,
    }
}

fn node_resources(map: Option<&BTreeMap<String, Quantity>>) -> NodeResources {
    let get = |key: &str| map.and_then(|m| m.get(key)).map(|q| q.0.clone());
    NodeResources {
        cpu: get("cpu"),
        memory: get("memory"),
        pods: get("pods"),
    }
}

/// Last timestamp, else event time, else creation time
fn event_time(event: &Event) -> Option<DateTime<Utc>> {
    parse_time(&event.last_timestamp)
        .or_else(|| parse_time(&event.event_time))
        .or_else(|| parse_time(&event.metadata.creation_timestamp))
}

/// Parse a Kubernetes timestamp through its RFC 3339 wire form
fn parse_time<T: Serialize>(time: &Option<T>) -> Option<DateTime<Utc>> {
    let value = serde_json::to_value(time.as_ref()?).ok()?;
    DateTime::parse_from_rfc3339(value.as_str()?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Integer prefix of a quantity such as `4`, `16384Ki` or `110`
fn leading_int(value: Option<&str>) -> i64 {
    let value = value.unwrap_or("0").trim();
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeCluster, object, pod};
    use super::*;
    use serde_json::json;

    fn reader(cluster: FakeCluster) -> StatusReader {
        StatusReader::new(Arc::new(cluster))
    }

    fn node(name: &str, ready: bool, cpu: &str, memory: &str) -> Node {
        object(json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": {
                "name": name,
                "labels": {
                    "node-role.kubernetes.io/control-plane": "",
                    "role": "validator"
                }
            },
            "status": {
                "conditions": [{ "type": "Ready", "status": if ready { "True" } else { "False" } }],
                "capacity": { "cpu": cpu, "memory": memory, "pods": "110" },
                "allocatable": { "cpu": cpu, "memory": memory, "pods": "110" },
                "addresses": [{ "type": "InternalIP", "address": "192.168.49.2" }],
                "nodeInfo": {
                    "kubeletVersion": "v1.31.0", "osImage": "Ubuntu", "kernelVersion": "6.1",
                    "architecture": "amd64", "containerRuntimeVersion": "docker://27",
                    "kubeProxyVersion": "v1.31.0", "machineID": "m", "operatingSystem": "linux",
                    "systemUUID": "u", "bootID": "b"
                }
            }
        }))
    }

    fn namespace(name: &str) -> k8s_openapi::api::core::v1::Namespace {
        object(json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": { "name": name },
            "status": { "phase": "Active" }
        }))
    }

    fn event(name: &str, last: Option<&str>, created: &str) -> Event {
        object(json!({
            "apiVersion": "v1",
            "kind": "Event",
            "metadata": { "name": name, "namespace": "default", "creationTimestamp": created },
            "involvedObject": { "kind": "Pod", "name": "seed-node-0", "namespace": "default" },
            "reason": name,
            "lastTimestamp": last
        }))
    }

    #[tokio::test]
    async fn test_pods_flattened_in_order() {
        let reader = reader(FakeCluster {
            pods: vec![
                pod("default", "seed-node-0", "Running", "seed-cluster"),
                pod("chain", "validator-node-0", "Pending", "validator-cluster"),
            ],
            ..Default::default()
        });

        let pods = reader.pods().await.unwrap();
        assert_eq!(
            serde_json::to_value(&pods).unwrap(),
            json!([
                { "name": "seed-node-0", "namespace": "default", "status": "Running" },
                { "name": "validator-node-0", "namespace": "chain", "status": "Pending" }
            ])
        );
    }

    #[tokio::test]
    async fn test_errors_name_the_operation() {
        let reader = reader(FakeCluster {
            unavailable: true,
            ..Default::default()
        });

        let err = reader.pods().await.unwrap_err();
        assert!(err.to_string().contains("failed to fetch pods from Kubernetes"));
        assert!(matches!(err.source, K8sError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_secrets_expose_key_names_only() {
        let secret = object(json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": { "name": "redis-auth", "namespace": "default" },
            "type": "Opaque",
            "data": { "password": "c2VjcmV0LXZhbHVl" }
        }));
        let reader = reader(FakeCluster {
            secrets: vec![secret],
            ..Default::default()
        });

        let secrets = reader.secrets().await.unwrap();
        assert_eq!(secrets[0].data_keys, vec!["password"]);

        let body = serde_json::to_string(&secrets).unwrap();
        assert!(!body.contains("c2VjcmV0LXZhbHVl"));
        assert!(body.contains(r#""type":"Opaque""#));
    }

    #[tokio::test]
    async fn test_node_summary() {
        let reader = reader(FakeCluster {
            nodes: vec![node("validator-cluster", true, "2", "4030196Ki")],
            ..Default::default()
        });

        let nodes = reader.nodes().await.unwrap();
        let node = &nodes[0];
        assert_eq!(node.status, "Ready");
        assert_eq!(node.roles, vec!["control-plane"]);
        assert_eq!(node.capacity.cpu.as_deref(), Some("2"));
        assert_eq!(node.kubelet_version.as_deref(), Some("v1.31.0"));
        assert_eq!(
            node.addresses.as_ref().unwrap()[0],
            AddressInfo {
                address_type: "InternalIP".to_string(),
                address: "192.168.49.2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_node_details_lists_scheduled_pods() {
        let reader = reader(FakeCluster {
            nodes: vec![node("seed-cluster", true, "1", "2Gi")],
            pods: vec![
                pod("default", "seed-node-0", "Running", "seed-cluster"),
                pod("default", "validator-node-0", "Running", "validator-cluster"),
            ],
            ..Default::default()
        });

        let details = reader.node_details("seed-cluster").await.unwrap();
        assert_eq!(details.pods_running.len(), 1);
        assert_eq!(details.pods_running[0].name.as_deref(), Some("seed-node-0"));
        assert!(details.system_info.is_some());
    }

    #[tokio::test]
    async fn test_namespace_resources() {
        let deployment = object(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "seed-node", "namespace": "chain" },
            "spec": {
                "replicas": 3,
                "selector": { "matchLabels": { "app": "seed" } },
                "template": { "spec": { "containers": [] } }
            },
            "status": { "readyReplicas": 2 }
        }));
        let reader = reader(FakeCluster {
            pods: vec![
                pod("chain", "seed-node-0", "Running", "seed-cluster"),
                pod("default", "other", "Running", "seed-cluster"),
            ],
            deployments: vec![deployment],
            ..Default::default()
        });

        let resources = reader.namespace_resources("chain").await.unwrap();
        assert_eq!(resources.namespace, "chain");
        assert_eq!(
            resources.resource_counts,
            ResourceCounts {
                pods: 1,
                deployments: 1,
                ..Default::default()
            }
        );
        assert_eq!(resources.deployments[0].replicas, "2/3");
    }

    #[tokio::test]
    async fn test_events_newest_first() {
        let reader = reader(FakeCluster {
            events: vec![
                event("old", Some("2024-01-01T00:00:00Z"), "2024-01-01T00:00:00Z"),
                event("created-only", None, "2024-03-01T00:00:00Z"),
                event("new", Some("2024-02-01T00:00:00Z"), "2023-12-01T00:00:00Z"),
            ],
            ..Default::default()
        });

        let events = reader.events(None).await.unwrap();
        let reasons: Vec<_> = events.iter().filter_map(|e| e.reason.as_deref()).collect();
        assert_eq!(reasons, vec!["created-only", "new", "old"]);
    }

    #[tokio::test]
    async fn test_events_are_capped() {
        let events = (0..150)
            .map(|i| {
                event(
                    &format!("e{}", i),
                    None,
                    &format!("2024-01-01T00:{:02}:{:02}Z", i / 60, i % 60),
                )
            })
            .collect();
        let reader = reader(FakeCluster {
            events,
            ..Default::default()
        });

        let events = reader.events(Some("default")).await.unwrap();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events[0].reason.as_deref(), Some("e149"));
    }

    #[tokio::test]
    async fn test_cluster_summary() {
        let reader = reader(FakeCluster {
            nodes: vec![
                node("seed-cluster", true, "2", "4194304Ki"),
                node("validator-cluster", false, "4", "2097152Ki"),
            ],
            namespaces: vec![namespace("default"), namespace("chain"), namespace("empty")],
            pods: vec![
                pod("chain", "validator-node-0", "Running", "validator-cluster"),
                pod("chain", "validator-node-1", "Pending", "validator-cluster"),
                pod("default", "seed-node-0", "Running", "seed-cluster"),
            ],
            ..Default::default()
        });

        let summary = reader.cluster_summary().await.unwrap();
        assert_eq!(summary.health.nodes, "1/2");
        assert_eq!(summary.health.pods, "2/3");
        assert_eq!(summary.counts.namespaces, 3);
        assert_eq!(summary.capacity.cpu, 6);
        assert_eq!(summary.capacity.memory_gi, 6.0);
        assert_eq!(summary.capacity.pods, 220);

        let top: Vec<_> = summary
            .top_namespaces
            .iter()
            .map(|n| (n.name.clone().unwrap(), n.pod_count))
            .collect();
        assert_eq!(
            top,
            vec![
                ("chain".to_string(), 2),
                ("default".to_string(), 1),
                ("empty".to_string(), 0)
            ]
        );
    }

    #[tokio::test]
    async fn test_resource_usage() {
        let reader = reader(FakeCluster {
            metrics: true,
            node_metrics: vec![object(json!({
                "metadata": { "name": "seed-cluster" },
                "window": "20s",
                "usage": { "cpu": "250m", "memory": "1024Mi" }
            }))],
            pod_metrics: vec![object(json!({
                "metadata": { "name": "seed-node-0", "namespace": "chain" },
                "containers": [{ "name": "seed-node", "usage": { "cpu": "5m", "memory": "48Mi" } }]
            }))],
            ..Default::default()
        });

        let usage = reader.resource_usage().await.unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&usage).unwrap(),
            json!({
                "nodes": [{
                    "name": "seed-cluster",
                    "usage": { "cpu": "250m", "memory": "1024Mi" },
                    "window": "20s"
                }],
                "pods": [{
                    "name": "seed-node-0",
                    "namespace": "chain",
                    "containers": [{ "name": "seed-node", "usage": { "cpu": "5m", "memory": "48Mi" } }]
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_resource_usage_without_metrics_api() {
        let reader = reader(FakeCluster::default());
        assert!(reader.resource_usage().await.unwrap().is_none());
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int(Some("16384Ki")), 16384);
        assert_eq!(leading_int(Some("110")), 110);
        assert_eq!(leading_int(None), 0);
        assert_eq!(leading_int(Some("abc")), 0);
    }
}
