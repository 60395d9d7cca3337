use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::{BoxError, Server};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TCP address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    addr: String,

    /// Snapshot broadcast period in milliseconds
    #[arg(short, long, default_value = "1000")]
    update_ms: u64,

    /// Collision sweep period in milliseconds
    #[arg(short, long, default_value = "250")]
    collision_ms: u64,

    /// Do not answer LAN discovery requests
    #[arg(long)]
    no_discovery: bool,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = ServerConfig::default().with_listen_addr(args.addr);
    config.update_interval = Duration::from_millis(args.update_ms.max(1));
    config.collision_interval = Duration::from_millis(args.collision_ms.max(1));
    if args.no_discovery {
        config = config.without_discovery();
    }

    info!(
        "Starting arena server (update {:?}, collision {:?})",
        config.update_interval, config.collision_interval
    );

    let mut server = Server::new(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
