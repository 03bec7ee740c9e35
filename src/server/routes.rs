use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::web::{Data, Path, Query};
use actix_web::{HttpResponse, Responder, ResponseError, get};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::{StatusError, StatusReader};
use crate::utils::Logger;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub namespace: Option<String>,
}

/// A failed status read. Only the fixed per-endpoint message reaches the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ErrorMessage {
                error: self.message.to_string(),
            })
    }
}

/// Log the underlying error and replace it with `message`
fn fail(log: &Logger, message: &'static str) -> impl FnOnce(StatusError) -> ApiError {
    let log = log.clone();
    move |e| {
        log.error(format!("{}: {}", message, e));
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(WelcomeMessage {
        message: "Welcome to the chainnet development API".to_string(),
    })
}

#[get("/status/pods")]
pub async fn pods(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let pods = reader
        .pods()
        .await
        .map_err(fail(&log, "Failed to fetch pods"))?;

    Ok(HttpResponse::Ok().json(pods))
}

#[get("/status/pods/{namespace}/{name}")]
pub async fn pod_details(
    reader: Data<StatusReader>,
    log: Data<Logger>,
    path: Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (namespace, name) = path.into_inner();
    let details = reader
        .pod_details(&namespace, &name)
        .await
        .map_err(fail(&log, "Failed to fetch pod details"))?;

    Ok(HttpResponse::Ok().json(details))
}

#[get("/status/services")]
pub async fn services(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let services = reader
        .services()
        .await
        .map_err(fail(&log, "Failed to fetch services"))?;

    Ok(HttpResponse::Ok().json(services))
}

#[get("/status/services/{namespace}/{name}")]
pub async fn service_details(
    reader: Data<StatusReader>,
    log: Data<Logger>,
    path: Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (namespace, name) = path.into_inner();
    let details = reader
        .service_details(&namespace, &name)
        .await
        .map_err(fail(&log, "Failed to fetch service details"))?;

    Ok(HttpResponse::Ok().json(details))
}

#[get("/status/deployments")]
pub async fn deployments(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let deployments = reader
        .deployments()
        .await
        .map_err(fail(&log, "Failed to fetch deployments"))?;

    Ok(HttpResponse::Ok().json(deployments))
}

#[get("/status/deployments/{namespace}/{name}")]
pub async fn deployment_details(
    reader: Data<StatusReader>,
    log: Data<Logger>,
    path: Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (namespace, name) = path.into_inner();
    let details = reader
        .deployment_details(&namespace, &name)
        .await
        .map_err(fail(&log, "Failed to fetch deployment details"))?;

    Ok(HttpResponse::Ok().json(details))
}

#[get("/status/nodes")]
pub async fn nodes(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let nodes = reader
        .nodes()
        .await
        .map_err(fail(&log, "Failed to fetch nodes"))?;

    Ok(HttpResponse::Ok().json(nodes))
}

#[get("/status/nodes/{name}")]
pub async fn node_details(
    reader: Data<StatusReader>,
    log: Data<Logger>,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    let details = reader
        .node_details(&path.into_inner())
        .await
        .map_err(fail(&log, "Failed to fetch node details"))?;

    Ok(HttpResponse::Ok().json(details))
}

#[get("/status/namespaces")]
pub async fn namespaces(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let namespaces = reader
        .namespaces()
        .await
        .map_err(fail(&log, "Failed to fetch namespaces"))?;

    Ok(HttpResponse::Ok().json(namespaces))
}

#[get("/status/namespaces/{namespace}/resources")]
pub async fn namespace_resources(
    reader: Data<StatusReader>,
    log: Data<Logger>,
    path: Path<String>,
) -> Result<HttpResponse, ApiError> {
    let resources = reader
        .namespace_resources(&path.into_inner())
        .await
        .map_err(fail(&log, "Failed to fetch namespace resources"))?;

    Ok(HttpResponse::Ok().json(resources))
}

#[get("/status/pvcs")]
pub async fn pvcs(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let pvcs = reader
        .persistent_volume_claims()
        .await
        .map_err(fail(&log, "Failed to fetch PVCs"))?;

    Ok(HttpResponse::Ok().json(pvcs))
}

#[get("/status/ingresses")]
pub async fn ingresses(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let ingresses = reader
        .ingresses()
        .await
        .map_err(fail(&log, "Failed to fetch ingresses"))?;

    Ok(HttpResponse::Ok().json(ingresses))
}

#[get("/status/configmaps")]
pub async fn config_maps(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let config_maps = reader
        .config_maps()
        .await
        .map_err(fail(&log, "Failed to fetch configmaps"))?;

    Ok(HttpResponse::Ok().json(config_maps))
}

#[get("/status/secrets")]
pub async fn secrets(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let secrets = reader
        .secrets()
        .await
        .map_err(fail(&log, "Failed to fetch secrets"))?;

    Ok(HttpResponse::Ok().json(secrets))
}

#[get("/status/events")]
pub async fn events(
    reader: Data<StatusReader>,
    log: Data<Logger>,
    query: Query<EventsQuery>,
) -> Result<HttpResponse, ApiError> {
    let events = reader
        .events(query.namespace.as_deref())
        .await
        .map_err(fail(&log, "Failed to fetch cluster events"))?;

    Ok(HttpResponse::Ok().json(events))
}

#[get("/status/summary")]
pub async fn summary(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let summary = reader
        .cluster_summary()
        .await
        .map_err(fail(&log, "Failed to build cluster summary"))?;

    Ok(HttpResponse::Ok().json(summary))
}

#[get("/status/usage")]
pub async fn usage(
    reader: Data<StatusReader>,
    log: Data<Logger>,
) -> Result<HttpResponse, ApiError> {
    let usage = reader
        .resource_usage()
        .await
        .map_err(fail(&log, "Failed to fetch resource usage"))?;

    match usage {
        Some(usage) => Ok(HttpResponse::Ok().json(usage)),
        None => Err(ApiError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Metrics API is not available in the cluster",
        }),
    }
}
