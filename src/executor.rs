use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::actions::Action;
use crate::backfill;
use crate::chain::Market;
use crate::config::{ScanConfig, TradeConfig};
use crate::events::Event;
use crate::fetch;
use crate::flows;
use crate::watcher::LiveWatcher;

/// Runs the side effects the reducer asks for. Every chain call happens in
/// a spawned task that reports back through the event channel.
pub struct Executor<M: Market + 'static> {
    market: Arc<M>,
    trade: TradeConfig,
    scan: ScanConfig,
    tx: mpsc::Sender<Event>,
    /// Tasks that belong to the current account
    tasks: Vec<JoinHandle<()>>,
}

impl<M: Market + 'static> Executor<M> {
    pub fn new(
        market: Arc<M>,
        trade: TradeConfig,
        scan: ScanConfig,
        tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            market,
            trade,
            scan,
            tx,
            tasks: Vec::new(),
        }
    }

    /// Run one action. Returns false when the app should stop.
    pub fn run(&mut self, action: Action) -> bool {
        debug!("[executor] {:?}", action);
        match action {
            Action::Authorize => self.spawn(|market, tx| async move {
                let event = match market.authorize().await {
                    Ok((account, chain_id)) => Event::AccountChanged { account, chain_id },
                    Err(e) => {
                        warn!("[executor] Authorize failed: {}", e);
                        Event::AuthorizeFailed(e.to_string())
                    }
                };
                let _ = tx.send(event).await;
            }),

            Action::RefreshBalances { account } => self.spawn(move |market, tx| async move {
                let event = match fetch::refresh_balances(&*market, account).await {
                    Ok(balances) => Event::BalanceRefreshed { account, balances },
                    Err(e) => {
                        warn!("[executor] Balance refresh failed: {}", e);
                        Event::BalanceFailed {
                            account,
                            reason: e.to_string(),
                        }
                    }
                };
                let _ = tx.send(event).await;
            }),

            Action::StartSession { account, chain_id } => {
                let window = self.scan.window_blocks;
                let poll = Duration::from_millis(self.scan.poll_interval_ms);
                let retry = Duration::from_secs(self.scan.retry_delay_secs);

                self.spawn(move |market, tx| async move {
                    let tip = match market.block_number().await {
                        Ok(tip) => tip,
                        Err(e) => {
                            warn!("[executor] Could not read tip: {}", e);
                            let _ = tx
                                .send(Event::ScanFailed {
                                    account,
                                    reason: e.to_string(),
                                })
                                .await;
                            return;
                        }
                    };

                    // Failure is already reported; live watching still helps
                    let _ = backfill::run(&*market, account, tip, window, &tx).await;

                    LiveWatcher::new(account, chain_id, tip + 1, window, poll, retry)
                        .run(&*market, &tx)
                        .await;
                });
            }

            Action::Buy { account } => {
                let trade = self.trade.clone();
                self.spawn(move |market, tx| async move {
                    let _ = flows::buy(&*market, account, &trade, &tx).await;
                });
            }

            Action::Sell { account, token_id } => self.spawn(move |market, tx| async move {
                let _ = flows::sell(&*market, account, token_id, &tx).await;
            }),

            Action::Approve { account, amount } => self.spawn(move |market, tx| async move {
                let _ = flows::approve(&*market, account, amount, &tx).await;
            }),

            Action::Teardown => self.teardown(),

            Action::Exit => {
                self.teardown();
                return false;
            }
        }
        true
    }

    fn spawn<F, Fut>(&mut self, f: F)
    where
        F: FnOnce(Arc<M>, mpsc::Sender<Event>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|h| !h.is_finished());
        let handle = tokio::spawn(f(self.market.clone(), self.tx.clone()));
        self.tasks.push(handle);
    }

    /// Abort everything started for the current account.
    pub fn teardown(&mut self) {
        let running = self.active_tasks();
        if running > 0 {
            info!("[executor] Tearing down {} task(s)", running);
        }
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|h| !h.is_finished()).count()
    }
}

impl<M: Market + 'static> Drop for Executor<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
