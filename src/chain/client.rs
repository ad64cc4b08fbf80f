use std::str::FromStr;

use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, TxHash, U256};
use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};

use super::bindings::{IBEP20, INftSwap};
use super::{logs, ChainError, Market};
use crate::config::{Config, ContractAddresses};
use crate::events::{TradeKind, TradeLog};

/// Connection to the node plus the three contract addresses. Built once per
/// run and shared behind an `Arc`.
pub struct ChainClient {
    provider: DynProvider,
    contracts: ContractAddresses,
    /// Address of the signer, when one is configured.
    signer: Option<Address>,
    watch: Option<Address>,
}

impl ChainClient {
    pub async fn connect(cfg: &Config) -> anyhow::Result<Self> {
        let contracts = cfg.addresses()?;
        let watch = cfg.watch_address()?;
        let rpc_url = cfg.chain.rpc_url.as_str();

        let (provider, signer) = match cfg.credentials.private_key.as_deref() {
            Some(key) => {
                let signer = PrivateKeySigner::from_str(key.trim())
                    .context("credentials.private_key is not a valid key")?;
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(signer)
                    .connect(rpc_url)
                    .await
                    .with_context(|| format!("connecting to {rpc_url}"))?
                    .erased();
                (provider, Some(address))
            }
            None => {
                let provider = ProviderBuilder::new()
                    .connect(rpc_url)
                    .await
                    .with_context(|| format!("connecting to {rpc_url}"))?
                    .erased();
                (provider, None)
            }
        };

        info!(
            "[chain] Connected to {} ({})",
            rpc_url,
            if signer.is_some() { "signing" } else { "read-only" }
        );

        Ok(Self {
            provider,
            contracts,
            signer,
            watch,
        })
    }

    fn nft(&self) -> INftSwap::INftSwapInstance<DynProvider> {
        INftSwap::new(self.contracts.nft, self.provider.clone())
    }

    fn token(&self, address: Address) -> IBEP20::IBEP20Instance<DynProvider> {
        IBEP20::new(address, self.provider.clone())
    }

    fn require_signer(&self) -> Result<Address, ChainError> {
        self.signer.ok_or(ChainError::ReadOnly)
    }
}

#[async_trait]
impl Market for ChainClient {
    async fn authorize(&self) -> Result<(Address, u64), ChainError> {
        let account = self.signer.or(self.watch).ok_or(ChainError::NoAccount)?;
        let chain_id = self.chain_id().await?;
        Ok((account, chain_id))
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider.get_chain_id().await.map_err(ChainError::rpc)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(ChainError::rpc)
    }

    async fn nft_balance(&self, account: Address) -> Result<U256, ChainError> {
        Ok(self.nft().balanceOf(account).call().await?)
    }

    async fn busd_balance(&self, account: Address) -> Result<U256, ChainError> {
        Ok(self.token(self.contracts.busd).balanceOf(account).call().await?)
    }

    async fn mmpro_balance(&self, account: Address) -> Result<U256, ChainError> {
        Ok(self.token(self.contracts.mmpro).balanceOf(account).call().await?)
    }

    async fn nft_price(&self) -> Result<U256, ChainError> {
        Ok(self.nft().nftPrice().call().await?)
    }

    async fn trade_logs(
        &self,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TradeLog>, ChainError> {
        let filter = Filter::new()
            .address(self.contracts.nft)
            .event_signature(vec![
                logs::signature(TradeKind::Buy),
                logs::signature(TradeKind::Sell),
            ])
            .topic1(account.into_word())
            .from_block(from_block)
            .to_block(to_block);

        let raw = self.provider.get_logs(&filter).await.map_err(ChainError::rpc)?;
        let decoded: Vec<TradeLog> = raw.iter().filter_map(logs::trade_log).collect();
        debug!(
            "[chain] {} trade logs in {}..={} ({} raw)",
            decoded.len(),
            from_block,
            to_block,
            raw.len()
        );
        Ok(decoded)
    }

    async fn buy(&self, min_swap_amount: U256, deadline: U256) -> Result<TxHash, ChainError> {
        self.require_signer()?;
        let pending = self.nft().buy(min_swap_amount, deadline).send().await?;
        Ok(*pending.tx_hash())
    }

    async fn sell(&self, token_id: U256) -> Result<TxHash, ChainError> {
        self.require_signer()?;
        let pending = self.nft().sell(token_id).send().await?;
        Ok(*pending.tx_hash())
    }

    async fn approve(&self, amount: U256) -> Result<TxHash, ChainError> {
        self.require_signer()?;
        let pending = self
            .token(self.contracts.busd)
            .approve(self.contracts.nft, amount)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<(), ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(1)
            .get_receipt()
            .await
            .map_err(ChainError::rpc)?;

        if receipt.status() {
            Ok(())
        } else {
            Err(ChainError::Reverted(format!("transaction {tx_hash} reverted")))
        }
    }
}
