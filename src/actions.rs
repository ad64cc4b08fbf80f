use alloy_primitives::{Address, U256};

/// Side effects the state reducer can request.
/// The executor turns these into chain calls and background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ask the wallet for the account.
    Authorize,

    /// Read NFT count, both token balances and the NFT price.
    RefreshBalances { account: Address },

    /// Start the per-account background work: history backfill, then live
    /// log watching.
    StartSession { account: Address, chain_id: u64 },

    /// Submit `buy(minSwapAmount, deadline)`.
    Buy { account: Address },

    /// Submit `sell(tokenId)`.
    Sell { account: Address, token_id: U256 },

    /// Submit a BUSD `approve` for the NFT contract.
    Approve { account: Address, amount: U256 },

    /// Abort all per-account background tasks.
    Teardown,

    /// Stop the app.
    Exit,
}
