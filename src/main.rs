use std::sync::Arc;

use nftswap_rs::chain::ChainClient;
use nftswap_rs::config::Config;
use nftswap_rs::events::Event;
use nftswap_rs::executor::Executor;
use nftswap_rs::state::AppState;
use nftswap_rs::{input, logging, view};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let cfg = Config::load(&path)?;
    logging::init(&cfg.general.log_level)?;
    info!("Loaded config: {:?}", cfg);

    // One chain context for the whole run
    let client = Arc::new(ChainClient::connect(&cfg).await?);

    // Create the event channel
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // Start inputs
    input::spawn(tx.clone());
    let ctrl_c = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c.send(Event::Shutdown).await;
        }
    });

    let mut executor = Executor::new(client, cfg.trade.clone(), cfg.scan.clone(), tx);
    let mut state = AppState::new();

    let mut last_view = view::render(&state);
    println!("{}\n{}", last_view, input::HELP);

    // Main event loop
    while let Some(event) = rx.recv().await {
        let mut running = true;
        for action in state.apply(event) {
            running &= executor.run(action);
        }
        if !running {
            println!("Shutting down...");
            break;
        }

        let current = view::render(&state);
        if current != last_view {
            println!("{current}");
            last_view = current;
        }
    }

    executor.teardown();
    Ok(())
}
