use alloy_primitives::Address;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chain::{ChainError, Market};
use crate::events::{Event, TradeLog};

/// Inclusive block ranges from `tip` down to genesis, `size` blocks each.
///
/// `BlockWindows::new(12_000, 5_000)` yields `7001..=12000`, `2001..=7000`,
/// `0..=2000`.
#[derive(Debug, Clone)]
pub struct BlockWindows {
    /// Upper bound of the next window. None once block 0 is covered.
    next_hi: Option<u64>,
    size: u64,
}

impl BlockWindows {
    pub fn new(tip: u64, size: u64) -> Self {
        Self {
            next_hi: Some(tip),
            size: size.max(1),
        }
    }
}

impl Iterator for BlockWindows {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let hi = self.next_hi?;
        let lo = hi.saturating_sub(self.size - 1);
        self.next_hi = lo.checked_sub(1);
        Some((lo, hi))
    }
}

/// Scan `account`'s Buy/Sell history from `tip` back to genesis.
///
/// Sends ScanStarted, one ScanWindow per window (so the token list fills in
/// as it goes), then ScanComplete. On error sends ScanFailed and returns it.
pub async fn run<M: Market + ?Sized>(
    market: &M,
    account: Address,
    tip: u64,
    window: u64,
    tx: &mpsc::Sender<Event>,
) -> Result<(), ChainError> {
    info!("[backfill] Scanning {} from block {} to genesis", account, tip);
    let _ = tx.send(Event::ScanStarted { account, tip }).await;

    let mut total = 0usize;
    for (from_block, to_block) in BlockWindows::new(tip, window) {
        let logs = match market.trade_logs(account, from_block, to_block).await {
            Ok(logs) => logs,
            Err(e) => {
                warn!(
                    "[backfill] Window {}..={} failed: {}",
                    from_block, to_block, e
                );
                let _ = tx
                    .send(Event::ScanFailed {
                        account,
                        reason: e.to_string(),
                    })
                    .await;
                return Err(e);
            }
        };

        total += logs.len();
        if !logs.is_empty() {
            debug!(
                "[backfill] {} logs in {}..={}",
                logs.len(),
                from_block,
                to_block
            );
        }

        let event = Event::ScanWindow {
            account,
            from_block,
            to_block,
            logs,
        };
        if tx.send(event).await.is_err() {
            // Receiver gone, app is shutting down
            return Ok(());
        }
    }

    info!("[backfill] Done: {} trade logs for {}", total, account);
    let _ = tx.send(Event::ScanComplete { account }).await;
    Ok(())
}

/// Collect the whole history in one go, without publishing progress.
pub async fn collect<M: Market + ?Sized>(
    market: &M,
    account: Address,
    tip: u64,
    window: u64,
) -> Result<Vec<TradeLog>, ChainError> {
    let mut all = Vec::new();
    for (from_block, to_block) in BlockWindows::new(tip, window) {
        all.extend(market.trade_logs(account, from_block, to_block).await?);
    }
    Ok(all)
}
