//! Buy, sell and approve. Each flow submits one transaction, waits for one
//! confirmation and reports every step as an Event.

use alloy_primitives::{Address, TxHash, U256};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::chain::{ChainError, Market};
use crate::config::TradeConfig;
use crate::events::{Event, Flow};

/// Swap deadline: `now_secs + deadline_secs`, never before the epoch.
pub fn swap_deadline(now_secs: i64, deadline_secs: i64) -> U256 {
    U256::from(now_secs.saturating_add(deadline_secs).max(0) as u64)
}

pub async fn buy<M: Market + ?Sized>(
    market: &M,
    account: Address,
    trade: &TradeConfig,
    tx: &mpsc::Sender<Event>,
) -> Result<(), ChainError> {
    let deadline = swap_deadline(chrono::Utc::now().timestamp(), trade.deadline_secs);
    let min_swap = U256::from(trade.min_swap_amount);
    info!("[flows] buy min_swap={} deadline={}", min_swap, deadline);

    let submit = market.buy(min_swap, deadline);
    let result = submit_and_confirm(account, Flow::Buy, tx, submit, market).await;
    match result {
        Err(ChainError::AllowanceExceeded) => {
            info!("[flows] buy needs BUSD allowance");
            let _ = tx.send(Event::AllowanceRequired { account }).await;
            Err(ChainError::AllowanceExceeded)
        }
        other => report(account, Flow::Buy, tx, other).await,
    }
}

pub async fn sell<M: Market + ?Sized>(
    market: &M,
    account: Address,
    token_id: U256,
    tx: &mpsc::Sender<Event>,
) -> Result<(), ChainError> {
    info!("[flows] sell token {}", token_id);
    let submit = market.sell(token_id);
    let result = submit_and_confirm(account, Flow::Sell, tx, submit, market).await;
    report(account, Flow::Sell, tx, result).await
}

pub async fn approve<M: Market + ?Sized>(
    market: &M,
    account: Address,
    amount: U256,
    tx: &mpsc::Sender<Event>,
) -> Result<(), ChainError> {
    info!("[flows] approve {} BUSD", amount);
    let submit = market.approve(amount);
    let result = submit_and_confirm(account, Flow::Approve, tx, submit, market).await;
    report(account, Flow::Approve, tx, result).await
}

async fn submit_and_confirm<M, F>(
    account: Address,
    flow: Flow,
    tx: &mpsc::Sender<Event>,
    submit: F,
    market: &M,
) -> Result<TxHash, ChainError>
where
    M: Market + ?Sized,
    F: std::future::Future<Output = Result<TxHash, ChainError>>,
{
    let tx_hash = submit.await?;
    let _ = tx.send(Event::TxSubmitted {
            account,
            flow,
            tx_hash,
        }).await;
    market.confirm(tx_hash).await?;
    Ok(tx_hash)
}

async fn report(
    account: Address,
    flow: Flow,
    tx: &mpsc::Sender<Event>,
    result: Result<TxHash, ChainError>,
) -> Result<(), ChainError> {
    match result {
        Ok(tx_hash) => {
            info!("[flows] {} confirmed: {}", flow.label(), tx_hash);
            let _ = tx.send(Event::TxConfirmed { account, flow }).await;
            Ok(())
        }
        Err(e) => {
            warn!("[flows] {} failed: {}", flow.label(), e);
            let _ = tx
                .send(Event::TxFailed {
                    account,
                    flow,
                    reason: e.to_string(),
                })
                .await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockMarket;
    use alloy_primitives::Address;

    fn account() -> Address {
        Address::with_last_byte(1)
    }

    fn market() -> MockMarket {
        MockMarket::new(account())
    }

    async fn run_and_drain<F, Fut>(f: F) -> (Result<(), ChainError>, Vec<Event>)
    where
        F: FnOnce(mpsc::Sender<Event>) -> Fut,
        Fut: std::future::Future<Output = Result<(), ChainError>>,
    {
        let (tx, mut rx) = mpsc::channel(16);
        let result = f(tx).await;
        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }
        (result, events)
    }

    #[test]
    fn test_swap_deadline() {
        assert_eq!(swap_deadline(1_700_000_000, 60), U256::from(1_700_000_060u64));
        assert_eq!(swap_deadline(-100, 60), U256::ZERO);
    }

    #[tokio::test]
    async fn test_buy_success() {
        let market = market();
        let trade = TradeConfig::default();

        let (m, t) = (&market, &trade);
        let (result, events) = run_and_drain(|tx| async move { buy(m, account(), t, &tx).await }).await;

        assert!(result.is_ok());
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::TxSubmitted {
                flow: Flow::Buy,
                ..
            }
        ));
        assert_eq!(
            events[1],
            Event::TxConfirmed {
                account: account(),
                flow: Flow::Buy
            }
        );
    }

    #[tokio::test]
    async fn test_buy_args() {
        let market = market();
        let trade = TradeConfig {
            min_swap_amount: 4,
            deadline_secs: 60,
        };
        let (tx, _rx) = mpsc::channel(16);
        let before = chrono::Utc::now().timestamp();

        buy(&market, account(), &trade, &tx).await.unwrap();

        let submitted = market.submitted();
        assert_eq!(submitted.len(), 1);
        let (name, args) = &submitted[0];
        assert_eq!(name, "buy");
        assert_eq!(args[0], U256::from(4));
        let deadline: u64 = args[1].try_into().unwrap();
        assert!(deadline >= (before + 60) as u64);
        assert!(deadline <= (before + 62) as u64);
        assert_eq!(market.count("confirm"), 1);
    }

    #[tokio::test]
    async fn test_buy_allowance_opens_popup() {
        let market = MockMarket {
            submit_error: Some(ChainError::AllowanceExceeded),
            ..market()
        };
        let trade = TradeConfig::default();

        let (m, t) = (&market, &trade);
        let (result, events) = run_and_drain(|tx| async move { buy(m, account(), t, &tx).await }).await;

        assert_eq!(result, Err(ChainError::AllowanceExceeded));
        assert_eq!(events, vec![Event::AllowanceRequired { account: account() }]);
    }

    #[tokio::test]
    async fn test_buy_other_revert_is_failure() {
        let market = MockMarket {
            submit_error: Some(ChainError::Reverted("paused".to_string())),
            ..market()
        };
        let trade = TradeConfig::default();

        let (m, t) = (&market, &trade);
        let (_, events) = run_and_drain(|tx| async move { buy(m, account(), t, &tx).await }).await;

        assert_eq!(
            events,
            vec![Event::TxFailed {
                account: account(),
                flow: Flow::Buy,
                reason: "reverted: paused".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_sell_confirm_reverted() {
        let market = MockMarket {
            confirm_error: Some(ChainError::Reverted("tx reverted".to_string())),
            ..market()
        };

        let m = &market;
        let (result, events) = run_and_drain(|tx| async move { sell(m, account(), U256::from(5), &tx).await }).await;

        assert!(result.is_err());
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::TxSubmitted {
                flow: Flow::Sell,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            Event::TxFailed {
                flow: Flow::Sell,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_approve_targets_amount() {
        let market = market();
        let (tx, _rx) = mpsc::channel(16);

        approve(&market, account(), U256::from(1_000), &tx).await.unwrap();

        assert_eq!(
            market.submitted(),
            vec![("approve".to_string(), vec![U256::from(1_000)])]
        );
    }

    #[tokio::test]
    async fn test_read_only_sell_fails() {
        let market = MockMarket {
            submit_error: Some(ChainError::ReadOnly),
            ..market()
        };
        let m = &market;
        let (result, events) = run_and_drain(|tx| async move { sell(m, account(), U256::from(1), &tx).await }).await;

        assert_eq!(result, Err(ChainError::ReadOnly));
        assert!(matches!(events[0], Event::TxFailed { .. }));
        assert_eq!(market.count("confirm"), 0);
    }
}
