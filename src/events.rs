use alloy_primitives::{Address, TxHash, U256};
use serde::Serialize;

use crate::input::Command;
use crate::state::Balances;

// Every state transition of the app is one of these, applied in order by the
// main loop. Account-scoped variants carry the account so messages from a
// torn-down session can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User typed a command
    Command(Command),

    // User typed something we could not parse
    InputRejected(String),

    // Wallet resolved an account (authorize)
    AccountChanged { account: Address, chain_id: u64 },

    AuthorizeFailed(String),

    // Node reports a different chain than the one we authorized on
    NetworkChanged { chain_id: u64 },

    // Fresh read of all four balance values
    BalanceRefreshed { account: Address, balances: Balances },

    BalanceFailed { account: Address, reason: String },

    // Backfill lifecycle
    ScanStarted { account: Address, tip: u64 },
    ScanWindow {
        account: Address,
        from_block: u64,
        to_block: u64,
        logs: Vec<TradeLog>,
    },
    ScanComplete { account: Address },
    ScanFailed { account: Address, reason: String },

    // Live contract events for the account
    TokenBought(TradeLog),
    TokenSold(TradeLog),

    // Transaction flows
    TxSubmitted {
        account: Address,
        flow: Flow,
        tx_hash: TxHash,
    },
    TxConfirmed { account: Address, flow: Flow },
    TxFailed {
        account: Address,
        flow: Flow,
        reason: String,
    },

    // Buy reverted because the NFT contract may not spend enough BUSD
    AllowanceRequired { account: Address },

    // Ctrl+C, stdin closed or `quit`
    Shutdown,
}

/// Which contract event a log came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TradeKind::Buy => "Buy",
            TradeKind::Sell => "Sell",
        }
    }
}

/// A decoded `Buy` or `Sell` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeLog {
    pub kind: TradeKind,
    pub buyer: Address,
    pub token_id: U256,
    pub block_number: u64,
    pub tx_hash: TxHash,
    pub log_index: u64,
}

impl TradeLog {
    /// Identity of the log on chain. The same log seen by the backfill and by
    /// the live watcher has the same key.
    pub fn key(&self) -> (TxHash, u64) {
        (self.tx_hash, self.log_index)
    }
}

/// The three transaction flows the user can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Buy,
    Sell,
    Approve,
}

impl Flow {
    pub fn label(&self) -> &'static str {
        match self {
            Flow::Buy => "buy",
            Flow::Sell => "sell",
            Flow::Approve => "approve",
        }
    }
}
