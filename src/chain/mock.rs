use std::sync::Mutex;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use super::{ChainError, Market};
use crate::events::{TradeKind, TradeLog};

/// In-memory chain for flow and backfill tests. Records every call by name.
#[derive(Default)]
pub struct MockMarket {
    pub account: Option<Address>,
    pub chain_id: u64,
    pub tip: u64,
    pub nft_balance: U256,
    pub busd_balance: U256,
    pub mmpro_balance: U256,
    pub nft_price: U256,
    pub logs: Vec<TradeLog>,
    /// Error to return from `buy`/`sell`/`approve` submission.
    pub submit_error: Option<ChainError>,
    /// Error to return from `confirm`.
    pub confirm_error: Option<ChainError>,
    /// Error to return from `trade_logs` for windows starting at or below this block.
    pub logs_error_below: Option<u64>,
    pub calls: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<(String, Vec<U256>)>>,
}

impl MockMarket {
    pub fn new(account: Address) -> Self {
        Self {
            account: Some(account),
            chain_id: 97,
            ..Default::default()
        }
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn submitted(&self) -> Vec<(String, Vec<U256>)> {
        self.submitted.lock().unwrap().clone()
    }

    fn submit(&self, name: &str, args: Vec<U256>) -> Result<TxHash, ChainError> {
        self.record(name);
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((name.to_string(), args));
        Ok(TxHash::with_last_byte(submitted.len() as u8))
    }
}

/// Build a trade log with a unique key derived from block and index.
pub fn trade(kind: TradeKind, buyer: Address, token_id: u64, block: u64, index: u64) -> TradeLog {
    TradeLog {
        kind,
        buyer,
        token_id: U256::from(token_id),
        block_number: block,
        tx_hash: TxHash::from(U256::from(block)),
        log_index: index,
    }
}

#[async_trait]
impl Market for MockMarket {
    async fn authorize(&self) -> Result<(Address, u64), ChainError> {
        self.record("authorize");
        let account = self.account.ok_or(ChainError::NoAccount)?;
        Ok((account, self.chain_id))
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.record("chain_id");
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.record("block_number");
        Ok(self.tip)
    }

    async fn nft_balance(&self, _account: Address) -> Result<U256, ChainError> {
        self.record("nft_balance");
        Ok(self.nft_balance)
    }

    async fn busd_balance(&self, _account: Address) -> Result<U256, ChainError> {
        self.record("busd_balance");
        Ok(self.busd_balance)
    }

    async fn mmpro_balance(&self, _account: Address) -> Result<U256, ChainError> {
        self.record("mmpro_balance");
        Ok(self.mmpro_balance)
    }

    async fn nft_price(&self) -> Result<U256, ChainError> {
        self.record("nft_price");
        Ok(self.nft_price)
    }

    async fn trade_logs(
        &self,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TradeLog>, ChainError> {
        self.record("trade_logs");
        if let Some(limit) = self.logs_error_below {
            if from_block <= limit {
                return Err(ChainError::Rpc("query timeout".to_string()));
            }
        }
        Ok(self
            .logs
            .iter()
            .filter(|l| l.buyer == account)
            .filter(|l| l.block_number >= from_block && l.block_number <= to_block)
            .cloned()
            .collect())
    }

    async fn buy(&self, min_swap_amount: U256, deadline: U256) -> Result<TxHash, ChainError> {
        self.submit("buy", vec![min_swap_amount, deadline])
    }

    async fn sell(&self, token_id: U256) -> Result<TxHash, ChainError> {
        self.submit("sell", vec![token_id])
    }

    async fn approve(&self, amount: U256) -> Result<TxHash, ChainError> {
        self.submit("approve", vec![amount])
    }

    async fn confirm(&self, _tx_hash: TxHash) -> Result<(), ChainError> {
        self.record("confirm");
        match &self.confirm_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
