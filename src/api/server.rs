use crate::config::Settings;
use crate::solver::Solver;
use actix_web::{web, App, HttpServer, middleware};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use anyhow::{Context, Result};
use tracing::{info, error};

use crate::api::handlers;

pub struct ApiState {
    pub solver: Arc<dyn Solver>,
    pub settings: Arc<Settings>,
}

/// Route table shared by the server and the handler tests
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(handlers::system::health))
        .service(
            web::scope("/apis/{group}/v1alpha1")
                .route("", web::get().to(handlers::system::discovery))
                .route("/{resource}", web::post().to(handlers::challenge::solve)),
        );
}

fn load_tls_config(cert_file: &str, key_file: &str) -> Result<rustls::ServerConfig> {
    let mut cert_reader = BufReader::new(
        File::open(cert_file).with_context(|| format!("Failed to open TLS certificate {}", cert_file))?,
    );
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse TLS certificate {}", cert_file))?;

    let mut key_reader = BufReader::new(
        File::open(key_file).with_context(|| format!("Failed to open TLS key {}", key_file))?,
    );
    let key = rustls_pemfile::private_key(&mut key_reader)
        .with_context(|| format!("Failed to parse TLS key {}", key_file))?
        .ok_or_else(|| anyhow::anyhow!("No private key found in {}", key_file))?;

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_no_client_auth()
    .with_single_cert(certs, key)?;

    Ok(config)
}

pub async fn start(settings: Arc<Settings>, solver: Arc<dyn Solver>) -> Result<()> {
    let api_addr = format!("{}:{}", settings.webhook.bind_address, settings.webhook.port);

    info!(
        "Starting webhook server on {} for {}/{}",
        api_addr, settings.webhook.group_name, solver.name()
    );

    let state = web::Data::new(ApiState {
        solver,
        settings: settings.clone(),
    });

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(routes)
    });

    if let Some(threads) = settings.server.threads {
        server = server.workers(threads);
    }

    let server = match (&settings.webhook.tls_cert_file, &settings.webhook.tls_key_file) {
        (Some(cert), Some(key)) => {
            let tls_config = load_tls_config(cert, key)?;
            info!("Serving HTTPS with certificate {}", cert);
            server.bind_rustls_0_23(&api_addr, tls_config)?.run()
        }
        _ => server.bind(&api_addr)?.run(),
    };

    info!("Webhook server listening on {}", api_addr);

    match server.await {
        Ok(_) => {
            info!("Webhook server shutdown gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Webhook server error: {}", e);
            Err(anyhow::anyhow!("Webhook server failed: {}", e))
        }
    }
}
