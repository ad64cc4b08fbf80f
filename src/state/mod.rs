mod balances;
mod popup;
mod scan;
mod tokens;
mod tx;

pub use balances::Balances;
pub use popup::AllowancePopup;
pub use scan::ScanProgress;
pub use tokens::TokenLedger;
pub use tx::{TxFlow, TxOutcome, TxPhase};

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::actions::Action;
use crate::events::{Event, Flow};
use crate::input::{Command, HELP};

/// Everything the view shows. Only `apply` mutates it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub balances: Balances,
    pub tokens: TokenLedger,
    pub scan: ScanProgress,
    pub buy: TxFlow,
    pub sell: TxFlow,
    pub popup: AllowancePopup,
    /// One-line feedback under the view
    pub status: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authorized(&self) -> bool {
        self.account.is_some()
    }

    /// Loading indicator for the token list. Clears only when the backfill
    /// reports completion.
    pub fn token_list_loading(&self) -> bool {
        self.authorized()
            && !self.scan.is_complete()
            && !matches!(self.scan, ScanProgress::Failed { .. })
    }

    /// Whether the derived token list agrees with the on-chain NFT count.
    pub fn token_list_in_sync(&self) -> bool {
        self.tokens.owned_count() as u64 == self.balances.nft_count
    }

    fn is_current(&self, account: Address) -> bool {
        self.account == Some(account)
    }

    fn flow_mut(&mut self, flow: Flow) -> &mut TxFlow {
        match flow {
            Flow::Buy => &mut self.buy,
            Flow::Sell => &mut self.sell,
            Flow::Approve => &mut self.popup.approve,
        }
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Apply one event and return the side effects it calls for.
    pub fn apply(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::Command(cmd) => self.on_command(cmd),

            Event::InputRejected(msg) => {
                self.set_status(msg);
                Vec::new()
            }

            Event::AccountChanged { account, chain_id } => {
                if self.is_current(account) && self.chain_id == Some(chain_id) {
                    self.set_status(format!("Already authorized as {account}"));
                    return vec![Action::RefreshBalances { account }];
                }

                let had_session = self.authorized();
                *self = AppState::new();
                self.account = Some(account);
                self.chain_id = Some(chain_id);
                self.set_status(format!("Authorized {account} on chain {chain_id}"));
                info!("[state] Account {} on chain {}", account, chain_id);

                let mut actions = Vec::new();
                if had_session {
                    actions.push(Action::Teardown);
                }
                actions.push(Action::RefreshBalances { account });
                actions.push(Action::StartSession { account, chain_id });
                actions
            }

            Event::AuthorizeFailed(reason) => {
                self.set_status(format!("Authorization failed: {reason}"));
                Vec::new()
            }

            Event::NetworkChanged { chain_id } => {
                if self.chain_id == Some(chain_id) {
                    return Vec::new();
                }
                warn!(
                    "[state] Network changed {:?} -> {}, resetting session",
                    self.chain_id, chain_id
                );
                *self = AppState::new();
                self.set_status(format!("Network changed to chain {chain_id}, authorize again"));
                vec![Action::Teardown]
            }

            Event::BalanceRefreshed { account, balances } => {
                if self.is_current(account) {
                    self.balances = balances;
                }
                Vec::new()
            }

            Event::BalanceFailed { account, reason } => {
                if self.is_current(account) {
                    self.set_status(format!("Balance refresh failed: {reason}"));
                }
                Vec::new()
            }

            Event::ScanStarted { account, tip } => {
                if self.is_current(account) {
                    self.scan.start(tip);
                }
                Vec::new()
            }

            Event::ScanWindow {
                account,
                from_block,
                to_block,
                logs,
            } => {
                if !self.is_current(account) {
                    return Vec::new();
                }
                for log in logs.iter().filter(|l| l.buyer == account) {
                    self.tokens.record(log);
                }
                self.scan.advance(from_block);
                debug!(
                    "[state] Window {}..={}: {} logs, {} owned",
                    from_block,
                    to_block,
                    logs.len(),
                    self.tokens.owned_count()
                );
                Vec::new()
            }

            Event::ScanComplete { account } => {
                if self.is_current(account) {
                    self.scan.complete();
                    if !self.token_list_in_sync() {
                        debug!(
                            "[state] Scan done with {} owned vs balance {}",
                            self.tokens.owned_count(),
                            self.balances.nft_count
                        );
                    }
                }
                Vec::new()
            }

            Event::ScanFailed { account, reason } => {
                if self.is_current(account) {
                    self.scan.fail(reason.clone());
                    self.set_status(format!("Token history scan failed: {reason}"));
                }
                Vec::new()
            }

            // The NFT count is re-read rather than adjusted: a confirmed
            // flow may already have refreshed it past this log.
            Event::TokenBought(log) => {
                if self.is_current(log.buyer) && self.tokens.add_owned(&log) {
                    return vec![Action::RefreshBalances { account: log.buyer }];
                }
                Vec::new()
            }

            Event::TokenSold(log) => {
                if self.is_current(log.buyer) && self.tokens.remove_owned(&log) {
                    return vec![Action::RefreshBalances { account: log.buyer }];
                }
                Vec::new()
            }

            Event::TxSubmitted {
                account,
                flow,
                tx_hash,
            } => {
                if !self.is_current(account) {
                    return Vec::new();
                }
                self.flow_mut(flow).submitted(tx_hash);
                self.set_status(format!("{} submitted: {tx_hash}", flow.label()));
                Vec::new()
            }

            Event::TxConfirmed { account, flow } => {
                if !self.is_current(account) {
                    return Vec::new();
                }
                self.set_status(format!("{} confirmed", flow.label()));
                match flow {
                    Flow::Approve => {
                        self.popup.approval_confirmed();
                        Vec::new()
                    }
                    Flow::Buy | Flow::Sell => {
                        self.flow_mut(flow).finish(TxOutcome::Confirmed);
                        vec![Action::RefreshBalances { account }]
                    }
                }
            }

            Event::TxFailed {
                account,
                flow,
                reason,
            } => {
                if !self.is_current(account) {
                    return Vec::new();
                }
                self.set_status(format!("{} failed: {reason}", flow.label()));
                self.flow_mut(flow).finish(TxOutcome::Reverted(reason));
                Vec::new()
            }

            Event::AllowanceRequired { account } => {
                if !self.is_current(account) {
                    return Vec::new();
                }
                self.buy.finish(TxOutcome::AllowanceRequired);
                self.popup.show();
                self.set_status("BUSD allowance too low: approve an amount with `allow <amount>`");
                Vec::new()
            }

            Event::Shutdown => vec![Action::Exit],
        }
    }

    fn on_command(&mut self, cmd: Command) -> Vec<Action> {
        match cmd {
            Command::Authorize => vec![Action::Authorize],

            Command::Quit => vec![Action::Exit],

            Command::Help => {
                self.set_status(HELP);
                Vec::new()
            }

            Command::Close => {
                self.popup.close();
                Vec::new()
            }

            Command::Refresh => match self.account {
                Some(account) => vec![Action::RefreshBalances { account }],
                None => self.need_account(),
            },

            Command::Buy => {
                let Some(account) = self.account else {
                    return self.need_account();
                };
                if !self.buy.begin() {
                    self.set_status("A buy is already pending");
                    return Vec::new();
                }
                vec![Action::Buy { account }]
            }

            Command::Sell(token_id) => {
                let Some(account) = self.account else {
                    return self.need_account();
                };
                if !self.sell.begin() {
                    self.set_status("A sell is already pending");
                    return Vec::new();
                }
                vec![Action::Sell { account, token_id }]
            }

            Command::Allow(amount) => {
                let Some(account) = self.account else {
                    return self.need_account();
                };
                if !self.popup.visible {
                    self.set_status("Nothing to approve right now");
                    return Vec::new();
                }
                if !self.popup.approve.begin() {
                    self.set_status("An approval is already pending");
                    return Vec::new();
                }
                vec![Action::Approve { account, amount }]
            }
        }
    }

    fn need_account(&mut self) -> Vec<Action> {
        self.set_status("Authorize first");
        Vec::new()
    }
}
