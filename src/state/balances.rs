/// Last balance read for the account.
/// Token amounts are base-unit decimal strings, as returned by the contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balances {
    pub nft_count: u64,
    pub busd: String,
    pub mmpro: String,
    pub nft_price: String,
}

impl Default for Balances {
    fn default() -> Self {
        Self {
            nft_count: 0,
            busd: "0".to_string(),
            mmpro: "0".to_string(),
            nft_price: "0".to_string(),
        }
    }
}
