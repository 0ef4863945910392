use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use vote::{
    build_rocket,
    config::{Args, Config},
    gateway::build_gateway,
    routes::AppState,
};

#[rocket::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚀 Starting vote server");

    let args = Args::parse();
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("vote: load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let gateway = match build_gateway(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("vote: connect to backend: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let figment = rocket::Config::figment()
        .merge(("address", config.addr.ip()))
        .merge(("port", config.addr.port()))
        .merge(("keep_alive", config.timeouts.idle.as_secs() as u32));

    info!("vote: listen on {}", config.addr);

    match build_rocket(AppState::new(gateway)).configure(figment).launch().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("vote: run server: {}", e);
            ExitCode::FAILURE
        }
    }
}
