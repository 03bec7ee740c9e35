use async_trait::async_trait;
use chainnet_dev::k8s::{ClusterApi, K8sError, NodeMetrics, PodMetrics};
use chainnet_dev::server::routes::ErrorMessage;
use chainnet_dev::status::StatusReader;
use chainnet_dev::utils::Logger;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    ConfigMap, Event, Namespace, Node, PersistentVolumeClaim, Pod, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::Arc;

/// Serves a fixed set of pods and secrets, or fails every call
#[derive(Default)]
struct MockCluster {
    pods: Vec<Pod>,
    secrets: Vec<Secret>,
    broken: bool,
}

impl MockCluster {
    fn check(&self) -> Result<(), K8sError> {
        if self.broken {
            Err(K8sError::Unavailable(
                "dial tcp 10.0.0.1:8443: connection refused".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn not_found(name: &str) -> K8sError {
        K8sError::Unavailable(format!("{} not found", name))
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn list_pods(
        &self,
        _namespace: Option<&str>,
        _field_selector: Option<&str>,
    ) -> Result<Vec<Pod>, K8sError> {
        self.check()?;
        Ok(self.pods.clone())
    }

    async fn get_pod(&self, _namespace: &str, name: &str) -> Result<Pod, K8sError> {
        self.check()?;
        self.pods
            .iter()
            .find(|p| p.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| Self::not_found(name))
    }

    async fn list_services(&self, _namespace: Option<&str>) -> Result<Vec<Service>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_service(&self, _namespace: &str, name: &str) -> Result<Service, K8sError> {
        Err(Self::not_found(name))
    }

    async fn list_deployments(
        &self,
        _namespace: Option<&str>,
    ) -> Result<Vec<Deployment>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_deployment(&self, _namespace: &str, name: &str) -> Result<Deployment, K8sError> {
        Err(Self::not_found(name))
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_node(&self, name: &str) -> Result<Node, K8sError> {
        Err(Self::not_found(name))
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn list_config_maps(
        &self,
        _namespace: Option<&str>,
    ) -> Result<Vec<ConfigMap>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn list_secrets(&self, _namespace: Option<&str>) -> Result<Vec<Secret>, K8sError> {
        self.check()?;
        Ok(self.secrets.clone())
    }

    async fn list_pvcs(
        &self,
        _namespace: Option<&str>,
    ) -> Result<Vec<PersistentVolumeClaim>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn list_ingresses(&self, _namespace: Option<&str>) -> Result<Vec<Ingress>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn list_events(&self, _namespace: Option<&str>) -> Result<Vec<Event>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn metrics_available(&self) -> Result<bool, K8sError> {
        self.check()?;
        Ok(false)
    }

    async fn list_node_metrics(&self) -> Result<Vec<NodeMetrics>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn list_pod_metrics(&self) -> Result<Vec<PodMetrics>, K8sError> {
        self.check()?;
        Ok(Vec::new())
    }
}

fn pod(namespace: &str, name: &str, phase: &str) -> Pod {
    serde_json::from_value(json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "containers": [] },
        "status": { "phase": phase }
    }))
    .unwrap()
}

struct TestApp {
    address: String,
    api_client: reqwest::Client,
}

impl TestApp {
    async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("failed to execute request")
    }
}

fn spawn_app(cluster: MockCluster) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let reader = StatusReader::new(Arc::new(cluster));
    let server = chainnet_dev::server::run(listener, reader, Logger::new("test"))
        .expect("failed to start server");
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn index_returns_welcome_json() {
    let app = spawn_app(MockCluster::default());

    let response = app.get("/").await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn pods_lists_every_pod_in_order() {
    let app = spawn_app(MockCluster {
        pods: vec![
            pod("chain", "seed-node-0", "Running"),
            pod("chain", "validator-node-0", "Pending"),
        ],
        ..Default::default()
    });

    let response = app.get("/status/pods").await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!([
            { "name": "seed-node-0", "namespace": "chain", "status": "Running" },
            { "name": "validator-node-0", "namespace": "chain", "status": "Pending" }
        ])
    );
}

#[tokio::test]
async fn secrets_expose_key_names_only() {
    let secret: Secret = serde_json::from_value(json!({
        "metadata": { "name": "validator-keys", "namespace": "chain" },
        "type": "Opaque",
        "data": { "private-key": "c2VjcmV0" }
    }))
    .unwrap();
    let app = spawn_app(MockCluster {
        secrets: vec![secret],
        ..Default::default()
    });

    let response = app.get("/status/secrets").await;
    assert_eq!(response.status().as_u16(), 200);

    let text = response.text().await.unwrap();
    assert!(text.contains("private-key"));
    assert!(!text.contains("c2VjcmV0"));
}

#[tokio::test]
async fn api_failure_becomes_500_without_details() {
    let app = spawn_app(MockCluster {
        broken: true,
        ..Default::default()
    });

    for (path, message) in [
        ("/status/pods", "Failed to fetch pods"),
        ("/status/nodes", "Failed to fetch nodes"),
        ("/status/summary", "Failed to build cluster summary"),
        ("/status/usage", "Failed to fetch resource usage"),
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status().as_u16(), 500, "{}", path);

        let body: ErrorMessage = response.json().await.unwrap();
        assert_eq!(body.error, message);
        assert!(!body.error.contains("connection refused"));
    }
}

#[tokio::test]
async fn missing_pod_details_is_500() {
    let app = spawn_app(MockCluster::default());

    let response = app.get("/status/pods/chain/unknown").await;
    assert_eq!(response.status().as_u16(), 500);

    let body: ErrorMessage = response.json().await.unwrap();
    assert_eq!(body.error, "Failed to fetch pod details");
}

#[tokio::test]
async fn usage_without_metrics_api_is_503() {
    let app = spawn_app(MockCluster::default());

    let response = app.get("/status/usage").await;
    assert_eq!(response.status().as_u16(), 503);

    let body: ErrorMessage = response.json().await.unwrap();
    assert_eq!(body.error, "Metrics API is not available in the cluster");
}
