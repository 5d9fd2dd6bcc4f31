use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use infoblox_solver::api;
use infoblox_solver::infoblox::InfobloxClient;
use infoblox_solver::secrets::ClusterConfig;
use infoblox_solver::{InfobloxSolver, Settings, Solver};

#[derive(Parser, Debug)]
#[command(name = "infoblox-solver")]
#[command(about = "cert-manager DNS-01 webhook solver for the Infoblox ESB gateway", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/solver.toml")]
    config: String,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Fails fast when GROUP_NAME is missing
    let settings = Settings::load(&args.config)?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("infoblox_solver={},actix_web=info", settings.server.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Infoblox DNS-01 solver for group {}", settings.webhook.group_name);

    let settings = Arc::new(settings);

    let client = InfobloxClient::new(
        &settings.infoblox.base_url,
        std::time::Duration::from_secs(settings.infoblox.timeout_secs),
    )?;
    let solver = InfobloxSolver::new(client);

    let cluster = ClusterConfig::from_settings(&settings.kubernetes)?;
    solver.initialize(&cluster)?;
    info!("Solver {} initialized against {}", solver.name(), cluster.api_server);

    api::server::start(Arc::clone(&settings), Arc::new(solver)).await
}
