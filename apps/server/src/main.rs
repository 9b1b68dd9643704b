#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;

use actix_web::{App, HttpServer, web};
use siteup::{Config, Orchestrator, Runtime};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

/// HTTP trigger surface: `siteup-server [CONFIG_PATH]`.
#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_config(std::env::args().nth(1))?;
    let runtime = Runtime::from_config(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    tracing::info!(%addr, "Starting HTTP server");
    run_server(addr, runtime.orchestrator.clone()).await?;

    runtime.shutdown().await;
    Ok(())
}

async fn run_server(addr: SocketAddr, orchestrator: Orchestrator) -> Result<(), AppError> {
    let state = web::Data::new(orchestrator);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
