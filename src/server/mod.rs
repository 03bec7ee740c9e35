//! HTTP status API

pub mod routes;

use actix_web::dev::{Server, ServerHandle};
use actix_web::{App, HttpServer, web};
use std::net::TcpListener;

use crate::config::settings::ServerSettings;
use crate::status::StatusReader;
use crate::utils::Logger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the configured address and prepare the server
    pub fn build(
        settings: &ServerSettings,
        reader: StatusReader,
        log: Logger,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(settings.address())?;
        let port = listener.local_addr()?.port();

        log.info(format!("Status API listening on {}", settings.address()));
        let server = run(listener, reader, log)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn handle(&self) -> ServerHandle {
        self.server.handle()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, reader: StatusReader, log: Logger) -> std::io::Result<Server> {
    let reader = web::Data::new(reader);
    let log = web::Data::new(log);

    let server = HttpServer::new(move || {
        App::new()
            .service(routes::index)
            .service(routes::pods)
            .service(routes::pod_details)
            .service(routes::services)
            .service(routes::service_details)
            .service(routes::deployments)
            .service(routes::deployment_details)
            .service(routes::nodes)
            .service(routes::node_details)
            .service(routes::namespaces)
            .service(routes::namespace_resources)
            .service(routes::pvcs)
            .service(routes::ingresses)
            .service(routes::config_maps)
            .service(routes::secrets)
            .service(routes::events)
            .service(routes::summary)
            .service(routes::usage)
            .app_data(reader.clone())
            .app_data(log.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
