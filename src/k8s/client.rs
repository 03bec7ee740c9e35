//! Read-only access to the Kubernetes API

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    ConfigMap, Event, Namespace, Node, PersistentVolumeClaim, Pod, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client, Resource};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Debug;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Debug, Error)]
pub enum K8sError {
    /// An error returned by the [`kube`] client, including kubeconfig loading.
    #[error("Kubernetes API request failed: {0}")]
    Kube(#[from] kube::Error),

    #[error("Kubernetes API unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected object from the Kubernetes API: {0}")]
    Decode(#[from] serde_json::Error),
}

/// API group served by metrics-server
pub const METRICS_GROUP: &str = "metrics.k8s.io";
const METRICS_VERSION: &str = "v1beta1";

/// `NodeMetrics` from `metrics.k8s.io/v1beta1`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeMetrics {
    pub metadata: ObjectMeta,
    pub window: Option<String>,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

/// `PodMetrics` from `metrics.k8s.io/v1beta1`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodMetrics {
    pub metadata: ObjectMeta,
    pub window: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

/// The Kubernetes reads the status API depends on.
///
/// `namespace: None` lists across all namespaces.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        field_selector: Option<&str>,
    ) -> Result<Vec<Pod>, K8sError>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, K8sError>;

    async fn list_services(&self, namespace: Option<&str>) -> Result<Vec<Service>, K8sError>;

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, K8sError>;

    async fn list_deployments(&self, namespace: Option<&str>)
    -> Result<Vec<Deployment>, K8sError>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, K8sError>;

    async fn list_nodes(&self) -> Result<Vec<Node>, K8sError>;

    async fn get_node(&self, name: &str) -> Result<Node, K8sError>;

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError>;

    async fn list_config_maps(&self, namespace: Option<&str>) -> Result<Vec<ConfigMap>, K8sError>;

    async fn list_secrets(&self, namespace: Option<&str>) -> Result<Vec<Secret>, K8sError>;

    async fn list_pvcs(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PersistentVolumeClaim>, K8sError>;

    async fn list_ingresses(&self, namespace: Option<&str>) -> Result<Vec<Ingress>, K8sError>;

    async fn list_events(&self, namespace: Option<&str>) -> Result<Vec<Event>, K8sError>;

    /// Whether the cluster serves [`METRICS_GROUP`]
    async fn metrics_available(&self) -> Result<bool, K8sError>;

    async fn list_node_metrics(&self) -> Result<Vec<NodeMetrics>, K8sError>;

    async fn list_pod_metrics(&self) -> Result<Vec<PodMetrics>, K8sError>;
}

/// [`ClusterApi`] backed by a [`kube::Client`] from the ambient kubeconfig.
///
/// The client is created on first use and shared by every request after that.
#[derive(Default)]
pub struct KubeClusterApi {
    client: OnceCell<Client>,
}

impl KubeClusterApi {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> Result<Client, K8sError> {
        let client = self
            .client
            .get_or_try_init(|| async { Client::try_default().await })
            .await?;
        Ok(client.clone())
    }

    async fn namespaced<K>(&self, namespace: Option<&str>) -> Result<Api<K>, K8sError>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        let client = self.client().await?;
        Ok(match namespace {
            Some(ns) => Api::namespaced(client, ns),
            None => Api::all(client),
        })
    }

    async fn list<K>(
        &self,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<K>, K8sError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = self.namespaced(namespace).await?;
        Ok(api.list(params).await?.items)
    }

    async fn get<K>(&self, namespace: &str, name: &str) -> Result<K, K8sError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = self.namespaced(Some(namespace)).await?;
        Ok(api.get(name).await?)
    }

    /// List a metrics.k8s.io kind across the cluster and decode it into `T`
    async fn list_metrics<T: DeserializeOwned>(
        &self,
        kind: &str,
        plural: &str,
    ) -> Result<Vec<T>, K8sError> {
        let gvk = GroupVersionKind::gvk(METRICS_GROUP, METRICS_VERSION, kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, plural);
        let api: Api<DynamicObject> = Api::all_with(self.client().await?, &resource);

        let objects = api.list(&ListParams::default()).await?.items;
        let metrics = objects
            .into_iter()
            .map(|object| serde_json::to_value(object).and_then(serde_json::from_value))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(metrics)
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn list_pods(
        &self,
        namespace: Option<&str>,
        field_selector: Option<&str>,
    ) -> Result<Vec<Pod>, K8sError> {
        let params = match field_selector {
            Some(selector) => ListParams::default().fields(selector),
            None => ListParams::default(),
        };
        self.list(namespace, &params).await
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, K8sError> {
        self.get(namespace, name).await
    }

    async fn list_services(&self, namespace: Option<&str>) -> Result<Vec<Service>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, K8sError> {
        self.get(namespace, name).await
    }

    async fn list_deployments(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<Deployment>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, K8sError> {
        self.get(namespace, name).await
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, K8sError> {
        let api: Api<Node> = Api::all(self.client().await?);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn get_node(&self, name: &str) -> Result<Node, K8sError> {
        let api: Api<Node> = Api::all(self.client().await?);
        Ok(api.get(name).await?)
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError> {
        let api: Api<Namespace> = Api::all(self.client().await?);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_config_maps(&self, namespace: Option<&str>) -> Result<Vec<ConfigMap>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_secrets(&self, namespace: Option<&str>) -> Result<Vec<Secret>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_pvcs(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PersistentVolumeClaim>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_ingresses(&self, namespace: Option<&str>) -> Result<Vec<Ingress>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn list_events(&self, namespace: Option<&str>) -> Result<Vec<Event>, K8sError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn metrics_available(&self) -> Result<bool, K8sError> {
        let groups = self.client().await?.list_api_groups().await?;
        Ok(groups.groups.iter().any(|g| g.name == METRICS_GROUP))
    }

    async fn list_node_metrics(&self) -> Result<Vec<NodeMetrics>, K8sError> {
        self.list_metrics("NodeMetrics", "nodes").await
    }

    async fn list_pod_metrics(&self) -> Result<Vec<PodMetrics>, K8sError> {
        self.list_metrics("PodMetrics", "pods").await
    }
}
