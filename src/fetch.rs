//! Balance and price reads. One call each, no retries, no caching.

use alloy_primitives::Address;

use crate::chain::{ChainError, Market};
use crate::state::Balances;

/// NFT count of the account. Saturates at u64::MAX.
pub async fn get_nft_balance<M: Market + ?Sized>(
    market: &M,
    account: Address,
) -> Result<u64, ChainError> {
    let count = market.nft_balance(account).await?;
    Ok(count.try_into().unwrap_or(u64::MAX))
}

pub async fn get_busd_balance<M: Market + ?Sized>(
    market: &M,
    account: Address,
) -> Result<String, ChainError> {
    Ok(market.busd_balance(account).await?.to_string())
}

pub async fn get_mmpro_balance<M: Market + ?Sized>(
    market: &M,
    account: Address,
) -> Result<String, ChainError> {
    Ok(market.mmpro_balance(account).await?.to_string())
}

pub async fn get_nft_price<M: Market + ?Sized>(market: &M) -> Result<String, ChainError> {
    Ok(market.nft_price().await?.to_string())
}

/// Read all four values, in order. The first failure aborts the refresh.
pub async fn refresh_balances<M: Market + ?Sized>(
    market: &M,
    account: Address,
) -> Result<Balances, ChainError> {
    let nft_count = get_nft_balance(market, account).await?;
    let busd = get_busd_balance(market, account).await?;
    let mmpro = get_mmpro_balance(market, account).await?;
    let nft_price = get_nft_price(market).await?;
    Ok(Balances {
        nft_count,
        busd,
        mmpro,
        nft_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockMarket;
    use alloy_primitives::U256;

    #[tokio::test]
    async fn test_refresh_reads_all_four_once() {
        let account = Address::with_last_byte(1);
        let market = MockMarket {
            nft_balance: U256::from(3),
            busd_balance: U256::from(1_500_000_000_000_000_000u64),
            mmpro_balance: U256::from(42),
            nft_price: U256::from(100),
            ..MockMarket::new(account)
        };

        let balances = refresh_balances(&market, account).await.unwrap();

        assert_eq!(
            balances,
            Balances {
                nft_count: 3,
                busd: "1500000000000000000".to_string(),
                mmpro: "42".to_string(),
                nft_price: "100".to_string(),
            }
        );
        assert_eq!(
            market.calls(),
            vec!["nft_balance", "busd_balance", "mmpro_balance", "nft_price"]
        );
    }

    #[tokio::test]
    async fn test_nft_balance_saturates() {
        let account = Address::with_last_byte(1);
        let market = MockMarket {
            nft_balance: U256::MAX,
            ..MockMarket::new(account)
        };
        assert_eq!(get_nft_balance(&market, account).await.unwrap(), u64::MAX);
    }
}
