use alloy::sol;

sol! {
    /// NFT sale contract. `buy` pulls `nftPrice` BUSD from the caller, swaps
    /// part of it to MMPRO and mints; `sell` burns and pays out.
    #[sol(rpc)]
    interface INftSwap {
        function balanceOf(address owner) external view returns (uint256);
        function nftPrice() external view returns (uint256);
        function buy(uint256 mmproSwapAmountMin, uint256 deadline) external;
        function sell(uint256 tokenId) external;

        event Buy(address indexed buyer, uint256 tokenId);
        event Sell(address indexed buyer, uint256 tokenId);
    }

    #[sol(rpc)]
    interface IBEP20 {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
