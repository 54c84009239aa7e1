//! Solidity ABI surface of the swap contracts.
//!
//! Only the functions and events the tooling calls are declared. Constructor
//! arguments are encoded with `SolValue::abi_encode_params`, which yields the
//! same bytes a constructor binding would append to the creation code.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolValue;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IEtherSwap {
        event Lockup(
            bytes32 indexed preimageHash,
            uint256 amount,
            address claimAddress,
            address indexed refundAddress,
            uint256 timelock
        );

        event Claim(bytes32 indexed preimageHash, bytes32 preimage);

        event Refund(bytes32 indexed preimageHash);

        function version() external pure returns (uint8);

        function swaps(bytes32) external view returns (bool);

        function hashValues(
            bytes32 preimageHash,
            uint256 amount,
            address claimAddress,
            address refundAddress,
            uint256 timelock
        ) external pure returns (bytes32);

        function lock(
            bytes32 preimageHash,
            address claimAddress,
            uint256 timelock
        ) external payable;

        function claim(
            bytes32 preimage,
            uint256 amount,
            address refundAddress,
            uint256 timelock
        ) external;

        function refund(
            bytes32 preimageHash,
            uint256 amount,
            address claimAddress,
            uint256 timelock
        ) external;
    }
}

/// `DummyDocMintERC20(address owner, uint256 mintFee, uint256 btcPrice)`
pub fn dummy_doc_args(owner: Address, mint_fee: U256, btc_price: U256) -> Bytes {
    (owner, mint_fee, btc_price).abi_encode_params().into()
}

/// `TestERC20(string name, string symbol, uint8 decimals, uint256 supply)`
pub fn test_erc20_args(name: &str, symbol: &str, decimals: u8, supply: U256) -> Bytes {
    // uint8 occupies a full word in the head; alloy has no SolValue for u8.
    (name.to_string(), symbol.to_string(), U256::from(decimals), supply)
        .abi_encode_params()
        .into()
}

/// `EtherSwap(address mocAddress, address docAddress)`
pub fn ether_swap_args(moc: Address, doc: Address) -> Bytes {
    (moc, doc).abi_encode_params().into()
}
