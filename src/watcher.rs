use std::time::Duration;

use alloy_primitives::Address;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::chain::{ChainError, Market};
use crate::events::{Event, TradeKind};

/// Follows new blocks after the backfill tip and forwards the account's
/// Buy/Sell logs as they land.
pub struct LiveWatcher {
    account: Address,
    chain_id: u64,
    /// First block not yet looked at
    next_block: u64,
    /// Largest block range per log query
    max_range: u64,
    poll_interval: Duration,
    retry_delay: Duration,
}

/// What one poll found.
#[derive(Debug, PartialEq, Eq)]
enum Poll {
    /// Keep going
    Continue,
    /// Node is on another chain now
    NetworkChanged(u64),
}

impl LiveWatcher {
    pub fn new(
        account: Address,
        chain_id: u64,
        next_block: u64,
        max_range: u64,
        poll_interval: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            account,
            chain_id,
            next_block,
            max_range: max_range.max(1),
            poll_interval,
            retry_delay,
        }
    }

    /// Poll until the channel closes or the network changes.
    pub async fn run<M: Market + ?Sized>(mut self, market: &M, tx: &mpsc::Sender<Event>) {
        debug!(
            "[watcher] Watching {} from block {}",
            self.account, self.next_block
        );
        loop {
            tokio::time::sleep(self.poll_interval).await;

            match self.poll(market, tx).await {
                Ok(Poll::Continue) => {}
                Ok(Poll::NetworkChanged(chain_id)) => {
                    let _ = tx.send(Event::NetworkChanged { chain_id }).await;
                    return;
                }
                Err(e) => {
                    warn!("[watcher] Poll failed: {}", e);
                    // Wait before retrying
                    debug!("[watcher] Retrying in {:?}...", self.retry_delay);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }

            if tx.is_closed() {
                return;
            }
        }
    }

    async fn poll<M: Market + ?Sized>(
        &mut self,
        market: &M,
        tx: &mpsc::Sender<Event>,
    ) -> Result<Poll, ChainError> {
        let chain_id = market.chain_id().await?;
        if chain_id != self.chain_id {
            return Ok(Poll::NetworkChanged(chain_id));
        }

        let tip = market.block_number().await?;
        if tip < self.next_block {
            return Ok(Poll::Continue);
        }

        let to_block = tip.min(self.next_block.saturating_add(self.max_range - 1));
        let logs = market.trade_logs(self.account, self.next_block, to_block).await?;
        for log in logs {
            debug!(
                "[watcher] {} token {} at block {}",
                log.kind.label(),
                log.token_id,
                log.block_number
            );
            let event = match log.kind {
                TradeKind::Buy => Event::TokenBought(log),
                TradeKind::Sell => Event::TokenSold(log),
            };
            let _ = tx.send(event).await;
        }

        // Only advance once the range was fully delivered
        self.next_block = to_block + 1;
        Ok(Poll::Continue)
    }
}
