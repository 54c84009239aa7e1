//! Swap record, preimages and amounts.
//!
//! A swap is identified on-chain by `hashValues`, the keccak256 of the
//! packed swap record. The claim condition is the sha256 of a 32 byte
//! preimage, the same hash a Lightning invoice carries as payment hash.

use std::fmt;
use std::str::FromStr;

use alloy::hex;
use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use rand::rngs::OsRng;
use rand::RngCore;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{AmountError, PreimageError};

/// Wei per satoshi: RBTC has 18 decimals, BTC has 8.
pub const WEI_PER_SAT: u64 = 10_000_000_000;

/// Wei per whole ether / RBTC.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// 32 byte secret whose sha256 unlocks a swap.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Preimage([u8; 32]);

impl Preimage {
    /// Draw a fresh preimage from the OS random generator.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a hex preimage, with or without `0x`.
    pub fn from_hex(input: &str) -> Result<Self, PreimageError> {
        let bytes =
            hex::decode(input.trim()).map_err(|e| PreimageError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| PreimageError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// sha256 of the preimage.
    pub fn hash(&self) -> B256 {
        B256::from_slice(&Sha256::digest(self.0))
    }

    /// The preimage as the `bytes32` argument of `claim`.
    pub const fn as_b256(&self) -> B256 {
        B256::new(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// Never print the secret in debug output.
impl fmt::Debug for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Preimage(hash={})", self.hash())
    }
}

impl FromStr for Preimage {
    type Err = PreimageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// The values the contract hashes into a swap identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapValues {
    pub preimage_hash: B256,
    /// Locked amount in wei.
    pub amount: U256,
    pub claim_address: Address,
    /// Sender of the lockup, who can refund after the timelock.
    pub refund_address: Address,
    /// Block height after which the swap is refundable.
    pub timelock: U256,
}

impl SwapValues {
    /// `keccak256(abi.encodePacked(preimageHash, amount, claimAddress, refundAddress, timelock))`
    pub fn hash_values(&self) -> B256 {
        let packed = (
            self.preimage_hash,
            self.amount,
            self.claim_address,
            self.refund_address,
            self.timelock,
        )
            .abi_encode_packed();
        keccak256(packed)
    }
}

/// An amount of the chain's native coin, in wei.
///
/// Parses `<n>sat`, `<n>wei` or a decimal coin value such as `0.00054420`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(U256);

impl Amount {
    pub const fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub fn from_sats(sats: u64) -> Self {
        Self(sats_to_wei(sats))
    }

    pub const fn wei(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(AmountError::Empty);
        }
        if input.starts_with('-') {
            return Err(AmountError::Negative(input.to_string()));
        }

        if let Some(sats) = input.strip_suffix("sat") {
            let sats: u64 = sats
                .trim()
                .parse()
                .map_err(|_| AmountError::Unparsable(input.to_string()))?;
            return Ok(Self::from_sats(sats));
        }

        if let Some(wei) = input.strip_suffix("wei") {
            let wei = U256::from_str(wei.trim())
                .map_err(|_| AmountError::Unparsable(input.to_string()))?;
            return Ok(Self(wei));
        }

        let coins =
            Decimal::from_str(input).map_err(|_| AmountError::Unparsable(input.to_string()))?;
        coins_to_wei(coins).map(Self).map_err(|e| match e {
            AmountError::Unparsable(_) => AmountError::Unparsable(input.to_string()),
            other => other,
        })
    }
}

/// 1 sat = 10^10 wei.
pub fn sats_to_wei(sats: u64) -> U256 {
    U256::from(sats) * U256::from(WEI_PER_SAT)
}

/// Convert a decimal coin value into wei, rejecting sub-wei precision.
pub fn coins_to_wei(coins: Decimal) -> Result<U256, AmountError> {
    if coins.is_sign_negative() && !coins.is_zero() {
        return Err(AmountError::Negative(coins.to_string()));
    }
    if coins.scale() > 18 {
        let normalized = coins.normalize();
        if normalized.scale() > 18 {
            return Err(AmountError::SubWei(coins.to_string()));
        }
        return coins_to_wei(normalized);
    }

    // mantissa * 10^(18 - scale), done in U256 to stay clear of Decimal's 96 bit limit.
    let mantissa = coins
        .mantissa()
        .to_u128()
        .ok_or_else(|| AmountError::Unparsable(coins.to_string()))?;
    let exponent = 18 - coins.scale();
    U256::from(mantissa)
        .checked_mul(U256::from(10u64).pow(U256::from(exponent)))
        .ok_or_else(|| AmountError::Overflow(coins.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};
    use rust_decimal_macros::dec;

    #[test]
    fn test_preimage_hash_is_sha256() {
        let preimage = Preimage::from_hex(
            "0xda41c1582e44e1ecff1d00771b81c1126663f23d769c32a7f94a752de266fecf",
        )
        .unwrap();
        let expected = B256::from_slice(&Sha256::digest(preimage.as_bytes()));
        assert_eq!(preimage.hash(), expected);
        assert_ne!(preimage.hash(), preimage.as_b256());
    }

    #[test]
    fn test_preimage_rejects_wrong_length() {
        assert_eq!(
            Preimage::from_hex("0xdeadbeef"),
            Err(PreimageError::InvalidLength(4))
        );
        assert!(matches!(
            Preimage::from_hex("zz"),
            Err(PreimageError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_random_preimages_differ() {
        assert_ne!(Preimage::random(), Preimage::random());
    }

    #[test]
    fn test_preimage_debug_hides_secret() {
        let preimage = Preimage::from_bytes([7u8; 32]);
        let debug = format!("{preimage:?}");
        assert!(!debug.contains(&preimage.to_string()));
    }

    #[test]
    fn test_hash_values_packs_136_bytes() {
        let values = SwapValues {
            preimage_hash: b256!(
                "88a032f71624c86e36d8214031a90577178de28d13626dcb08b78da2305df9e6"
            ),
            amount: sats_to_wei(59_458),
            claim_address: address!("4217BD283e9Dc9A2cE3d5D20fAE34AA0902C28db"),
            refund_address: address!("0000000000000000000000000000000000000001"),
            timelock: U256::from(4_454_889u64),
        };

        let mut packed = Vec::with_capacity(136);
        packed.extend_from_slice(values.preimage_hash.as_slice());
        packed.extend_from_slice(&values.amount.to_be_bytes::<32>());
        packed.extend_from_slice(values.claim_address.as_slice());
        packed.extend_from_slice(values.refund_address.as_slice());
        packed.extend_from_slice(&values.timelock.to_be_bytes::<32>());
        assert_eq!(packed.len(), 136);

        assert_eq!(values.hash_values(), keccak256(&packed));
    }

    #[test]
    fn test_sats_to_wei() {
        assert_eq!(sats_to_wei(54_420), U256::from(544_200_000_000_000u64));
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!(
            "54420sat".parse::<Amount>().unwrap().wei(),
            U256::from(544_200_000_000_000u64)
        );
        assert_eq!("55000wei".parse::<Amount>().unwrap().wei(), U256::from(55_000u64));
        assert_eq!(
            "0.00054420".parse::<Amount>().unwrap().wei(),
            U256::from(544_200_000_000_000u64)
        );
        assert_eq!(
            "1".parse::<Amount>().unwrap().wei(),
            U256::from(WEI_PER_ETHER)
        );
    }

    #[test]
    fn test_amount_rejects_bad_input() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert!(matches!("-1".parse::<Amount>(), Err(AmountError::Negative(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Unparsable(_))));
        assert!(matches!("1.5sat".parse::<Amount>(), Err(AmountError::Unparsable(_))));
    }

    #[test]
    fn test_coins_to_wei_rejects_sub_wei() {
        let tiny = dec!(0.0000000000000000001);
        assert!(matches!(coins_to_wei(tiny), Err(AmountError::SubWei(_))));
    }

    #[test]
    fn test_coins_to_wei_trailing_zeros_beyond_wei() {
        let padded = dec!(1.0000000000000000000);
        assert_eq!(coins_to_wei(padded).unwrap(), U256::from(WEI_PER_ETHER));
    }
}
