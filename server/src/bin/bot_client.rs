//! Headless arena client: connects, presses random buttons and logs snapshots.

use clap::Parser;
use log::{info, warn};
use rand::Rng;
use server::codec::{read_packet, write_packet};
use server::discovery::{self, DISCOVERY_GROUP};
use server::network::BoxError;
use shared::{Button, ClientPacket, ServerPacket, Update};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval, sleep};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address; found through LAN discovery when omitted
    #[arg(short, long)]
    server: Option<SocketAddr>,

    /// Buttons pressed per second
    #[arg(short, long, default_value = "1.0", value_parser = parse_rate)]
    actions_per_sec: f32,

    /// Stop after this many seconds (0 runs forever)
    #[arg(short, long, default_value = "0")]
    duration_secs: u64,
}

fn parse_rate(s: &str) -> Result<f32, String> {
    let rate: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("{} is not a positive finite rate", s))
    }
}

/// Delay between presses, kept away from zero.
fn action_period(rate: f32) -> Duration {
    Duration::from_secs_f32(1.0 / rate.clamp(0.01, 1000.0))
}

fn random_button(rng: &mut impl Rng) -> Button {
    match rng.gen_range(0..10) {
        0..=5 => Button::Fire,
        6..=8 => Button::Turn,
        _ => Button::PlaceBrick,
    }
}

fn summarize(update: &Update) {
    let own = update.own_cannon();
    info!(
        "t={:.2} team={} fuel={:.2} life={:.2} cannons={} missiles={} bricks={} score={}-{}{}",
        update.timestamp.as_secs(),
        update.team,
        update.fuel,
        own.map(|c| c.life).unwrap_or(0.0),
        update.cannons.len(),
        update.missiles.len(),
        update.bricks.len(),
        update.scores[0],
        update.scores[1],
        if update.fire_sound { " *boom*" } else { "" }
    );
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let server = match args.server {
        Some(addr) => addr,
        None => {
            info!("Looking for an arena on {}", DISCOVERY_GROUP);
            discovery::request(DISCOVERY_GROUP, Duration::from_secs(2)).await?
        }
    };

    info!("Connecting to {}", server);
    let stream = TcpStream::connect(server).await?;
    let (mut reader, mut writer) = stream.into_split();

    let receiver = tokio::spawn(async move {
        loop {
            match read_packet::<_, ServerPacket>(&mut reader).await {
                Ok(ServerPacket::Update(update)) => summarize(&update),
                Err(e) => {
                    warn!("Connection lost: {}", e);
                    break;
                }
            }
        }
    });

    let period = action_period(args.actions_per_sec);
    let sender = tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            let button = random_button(&mut rand::thread_rng());
            if let Err(e) = write_packet(&mut writer, &ClientPacket::Input(button)).await {
                warn!("Failed to send {:?}: {}", button, e);
                break;
            }
        }
    });

    let deadline = async {
        if args.duration_secs == 0 {
            std::future::pending::<()>().await
        } else {
            sleep(Duration::from_secs(args.duration_secs)).await
        }
    };

    tokio::select! {
        _ = receiver => {}
        _ = sender => {}
        _ = deadline => info!("Done after {}s", args.duration_secs),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    Ok(())
}
