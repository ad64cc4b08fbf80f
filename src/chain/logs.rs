use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, B256, U256};

use super::bindings::INftSwap;
use crate::events::{TradeKind, TradeLog};

/// Topic0 of a trade event.
pub fn signature(kind: TradeKind) -> B256 {
    match kind {
        TradeKind::Buy => INftSwap::Buy::SIGNATURE_HASH,
        TradeKind::Sell => INftSwap::Sell::SIGNATURE_HASH,
    }
}

fn kind_of(topic0: &B256) -> Option<TradeKind> {
    if *topic0 == INftSwap::Buy::SIGNATURE_HASH {
        Some(TradeKind::Buy)
    } else if *topic0 == INftSwap::Sell::SIGNATURE_HASH {
        Some(TradeKind::Sell)
    } else {
        None
    }
}

/// Decode `(kind, buyer, token_id)` from raw topics and data.
///
/// `buyer` is always indexed. `tokenId` is read from topic2 when the
/// deployment indexes it, otherwise from the first data word.
pub fn decode_trade(topics: &[B256], data: &[u8]) -> Option<(TradeKind, Address, U256)> {
    let kind = kind_of(topics.first()?)?;
    let buyer = Address::from_word(*topics.get(1)?);
    let token_id = match topics.get(2) {
        Some(word) => U256::from_be_bytes(word.0),
        None => {
            let word = data.get(..32)?;
            U256::from_be_slice(word)
        }
    };
    Some((kind, buyer, token_id))
}

/// Convert an RPC log. Pending logs (no block or tx hash yet) are skipped.
pub fn trade_log(log: &Log) -> Option<TradeLog> {
    let (kind, buyer, token_id) = decode_trade(log.topics(), &log.data().data)?;
    Some(TradeLog {
        kind,
        buyer,
        token_id,
        block_number: log.block_number?,
        tx_hash: log.transaction_hash?,
        log_index: log.log_index?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(v: u64) -> B256 {
        B256::from(U256::from(v))
    }

    #[test]
    fn test_decode_data_token_id() {
        let buyer = Address::with_last_byte(7);
        let topics = [signature(TradeKind::Buy), buyer.into_word()];
        let data = word(42).0;

        let (kind, who, id) = decode_trade(&topics, &data).unwrap();
        assert_eq!(kind, TradeKind::Buy);
        assert_eq!(who, buyer);
        assert_eq!(id, U256::from(42));
    }

    #[test]
    fn test_decode_indexed_token_id() {
        let buyer = Address::with_last_byte(7);
        let topics = [signature(TradeKind::Sell), buyer.into_word(), word(9)];

        let (kind, _, id) = decode_trade(&topics, &[]).unwrap();
        assert_eq!(kind, TradeKind::Sell);
        assert_eq!(id, U256::from(9));
    }

    #[test]
    fn test_decode_rejects_foreign_event() {
        let topics = [B256::repeat_byte(0xab), Address::ZERO.into_word()];
        assert!(decode_trade(&topics, &word(1).0).is_none());
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let topics = [signature(TradeKind::Buy), Address::ZERO.into_word()];
        assert!(decode_trade(&topics, &[0u8; 16]).is_none());
        // Missing buyer topic
        assert!(decode_trade(&topics[..1], &word(1).0).is_none());
    }

    #[test]
    fn test_signatures_differ() {
        assert_ne!(signature(TradeKind::Buy), signature(TradeKind::Sell));
    }
}
