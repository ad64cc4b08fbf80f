use std::collections::{BTreeMap, HashSet};

use alloy_primitives::{TxHash, U256};

use crate::events::{TradeKind, TradeLog};

/// Every token the account ever bought and ever sold.
/// Owned tokens are derived from these two lists on demand and never stored.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    bought: Vec<U256>,
    sold: Vec<U256>,
    /// Logs already applied, by (tx hash, log index)
    seen: HashSet<(TxHash, u64)>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Record a historical log. Order does not matter: backfill walks from the
    /// tip backwards, so a `Sell` usually arrives before its `Buy`.
    /// Returns false if the log was already applied.
    pub fn record(&mut self, log: &TradeLog) -> bool {
        if !self.seen.insert(log.key()) {
            return false;
        }
        match log.kind {
            TradeKind::Buy => self.bought.push(log.token_id),
            TradeKind::Sell => self.sold.push(log.token_id),
        }
        true
    }

    // =========================================================================
    // LIVE ADD / REMOVE
    // =========================================================================

    /// Apply a live `Buy`. A token already owned is not added twice.
    /// Returns true if the owned set grew.
    pub fn add_owned(&mut self, log: &TradeLog) -> bool {
        if !self.seen.insert(log.key()) {
            return false;
        }
        if self.owns(log.token_id) {
            return false;
        }
        self.bought.push(log.token_id);
        true
    }

    /// Apply a live `Sell`. Removing a token that is not owned is a no-op on
    /// the owned set. The sale is still remembered so an older `Buy` arriving
    /// later from the backfill does not resurrect the token.
    /// Returns true if the owned set shrank.
    pub fn remove_owned(&mut self, log: &TradeLog) -> bool {
        if !self.seen.insert(log.key()) {
            return false;
        }
        let was_owned = self.owns(log.token_id);
        self.sold.push(log.token_id);
        was_owned
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn ever_bought(&self) -> &[U256] {
        &self.bought
    }

    pub fn ever_sold(&self) -> &[U256] {
        &self.sold
    }

    /// Net buys per token: buys minus sells, floored at zero.
    fn net(&self) -> BTreeMap<U256, u64> {
        let mut net: BTreeMap<U256, (u64, u64)> = BTreeMap::new();
        for id in &self.bought {
            net.entry(*id).or_default().0 += 1;
        }
        for id in &self.sold {
            net.entry(*id).or_default().1 += 1;
        }
        net.into_iter()
            .map(|(id, (buys, sells))| (id, buys.saturating_sub(sells)))
            .collect()
    }

    /// Owned token ids in ascending order, without duplicates.
    pub fn owned(&self) -> Vec<U256> {
        self.net()
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn owns(&self, token_id: U256) -> bool {
        let buys = self.bought.iter().filter(|id| **id == token_id).count();
        let sells = self.sold.iter().filter(|id| **id == token_id).count();
        buys > sells
    }

    pub fn owned_count(&self) -> usize {
        self.owned().len()
    }

    pub fn clear(&mut self) {
        self.bought.clear();
        self.sold.clear();
        self.seen.clear();
    }
}
