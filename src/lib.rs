//! chainnet-dev: deploy the chainnet blockchain test network on minikube
//! and serve its Kubernetes status over HTTP.

pub mod commands;
pub mod config;
pub mod k8s;
pub mod server;
pub mod status;
pub mod utils;
