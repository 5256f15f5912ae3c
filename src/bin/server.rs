//! Session server binary.
//!
//! Boots one authoritative auto-battler session: binds the listener,
//! waits for the lobby to fill and ready up, then runs the match to
//! its conclusion.

use clap::Parser;
use nexusarena::config::Settings;
use nexusarena::session::Session;

#[derive(Parser)]
#[command(about = "Authoritative auto-battler session server")]
struct Args {
    /// listen port
    #[arg(long, default_value_t = 7777)]
    port: u16,
    /// seats in the lobby (2-8)
    #[arg(long, default_value_t = 8)]
    players: usize,
    /// session seed; omit for a fresh one
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nexusarena::init();
    let args = Args::parse();
    let mut settings = Settings::default();
    settings.net.port = args.port;
    settings.net.max_clients = args.players.clamp(2, 8);
    settings.seed = args.seed.unwrap_or_else(rand::random);
    log::info!("session seed {}", settings.seed);
    Session::start(settings).await?.run().await
}
