//! Chain access: contract bindings, the `Market` port and its alloy-backed
//! implementation.

pub mod bindings;
mod client;
mod error;
pub mod logs;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ChainClient;
pub use error::{classify_revert, ChainError, Revert, ALLOWANCE_EXCEEDED_REASON};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::events::TradeLog;

/// Everything the app needs from the chain. One implementation talks to a
/// node; tests use an in-memory one.
#[async_trait]
pub trait Market: Send + Sync {
    /// Resolve the account this session acts for, plus the chain id.
    async fn authorize(&self) -> Result<(Address, u64), ChainError>;

    async fn chain_id(&self) -> Result<u64, ChainError>;
    async fn block_number(&self) -> Result<u64, ChainError>;

    async fn nft_balance(&self, account: Address) -> Result<U256, ChainError>;
    async fn busd_balance(&self, account: Address) -> Result<U256, ChainError>;
    async fn mmpro_balance(&self, account: Address) -> Result<U256, ChainError>;
    async fn nft_price(&self) -> Result<U256, ChainError>;

    /// `Buy` and `Sell` logs of `account` in `[from_block, to_block]`.
    async fn trade_logs(
        &self,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TradeLog>, ChainError>;

    async fn buy(&self, min_swap_amount: U256, deadline: U256) -> Result<TxHash, ChainError>;
    async fn sell(&self, token_id: U256) -> Result<TxHash, ChainError>;
    /// Approve the NFT contract to spend `amount` BUSD.
    async fn approve(&self, amount: U256) -> Result<TxHash, ChainError>;

    /// Wait for one confirmation. A reverted receipt is an error.
    async fn confirm(&self, tx_hash: TxHash) -> Result<(), ChainError>;
}
