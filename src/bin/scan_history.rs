use std::str::FromStr;
use std::time::Instant;

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use serde::Serialize;

use nftswap_rs::backfill;
use nftswap_rs::chain::{ChainClient, Market};
use nftswap_rs::config::Config;
use nftswap_rs::events::TradeLog;
use nftswap_rs::state::TokenLedger;

#[derive(Serialize)]
struct Report {
    account: Address,
    tip: u64,
    ever_bought: Vec<String>,
    ever_sold: Vec<String>,
    owned: Vec<String>,
    logs: Vec<TradeLog>,
}

/// One-shot history scan: `scan_history <config.toml> <address> [--json]`
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, address) = match args.as_slice() {
        [path, address, ..] => (path.as_str(), address.as_str()),
        _ => return Err(anyhow!("usage: scan_history <config.toml> <address> [--json]")),
    };
    let json = args.iter().any(|a| a == "--json");
    let account = Address::from_str(address)?;

    let cfg = Config::load(path)?;
    let client = ChainClient::connect(&cfg).await?;

    let tip = client.block_number().await?;
    let start = Instant::now();
    let logs = backfill::collect(&client, account, tip, cfg.scan.window_blocks).await?;
    let scan_ms = start.elapsed().as_millis();

    let mut ledger = TokenLedger::new();
    for log in &logs {
        ledger.record(log);
    }

    let report = Report {
        account,
        tip,
        ever_bought: ledger.ever_bought().iter().map(|id| id.to_string()).collect(),
        ever_sold: ledger.ever_sold().iter().map(|id| id.to_string()).collect(),
        owned: ledger.owned().iter().map(|id| id.to_string()).collect(),
        logs,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Account: {} | Tip: {} | Scan: {}ms", report.account, report.tip, scan_ms);
        println!("Ever bought: {}", report.ever_bought.join(", "));
        println!("Ever sold:   {}", report.ever_sold.join(", "));
        println!("Owned:       {}", report.owned.join(", "));
    }

    Ok(())
}
