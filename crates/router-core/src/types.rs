//! Core type definitions for the auto-router

use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Token identifier (e.g. "USDC-c76f1f")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl FromStr for TokenId {
    type Err = Infallible;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(id.trim()))
    }
}

const PUBKEY_LEN: usize = 32;
const CONTRACT_PREFIX_LEN: usize = 8;

/// On-chain address (bech32 account or contract)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the bech32 form into the raw public key bytes.
    ///
    /// Returns `None` for a bad charset, checksum or padding.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        bech32::decode(&self.0).ok().map(|(_, data)| data)
    }

    /// Smart contract addresses carry a zeroed VM prefix in their public key
    pub fn is_contract(&self) -> bool {
        self.to_bytes().is_some_and(|bytes| {
            bytes.len() == PUBKEY_LEN && bytes[..CONTRACT_PREFIX_LEN].iter().all(|b| *b == 0)
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

impl FromStr for Address {
    type Err = Infallible;

    fn from_str(addr: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(addr.trim()))
    }
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Devnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
        }
    }

    /// Chain ID stamped on every transaction
    pub fn chain_id(&self) -> &'static str {
        match self {
            Self::Mainnet => "1",
            Self::Devnet => "D",
            Self::Testnet => "T",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub decimals: u32,
}

impl Token {
    pub fn new(id: impl Into<String>, decimals: u32) -> Self {
        Self {
            id: TokenId::new(id),
            decimals,
        }
    }

    /// One whole token expressed in smallest units (10^decimals)
    pub fn one_unit(&self) -> BigUint {
        BigUint::from(10u32).pow(self.decimals)
    }
}

/// Pool trading state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolState {
    Active,
    Paused,
}

/// Constant-product liquidity pool as read from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub address: Address,
    pub token_a: TokenId,
    pub token_b: TokenId,
    #[serde(with = "serde_amount")]
    pub reserve_a: BigUint,
    #[serde(with = "serde_amount")]
    pub reserve_b: BigUint,
    #[serde(with = "serde_amount")]
    pub total_supply: BigUint,
    /// Total swap fee as a fraction in [0, 1), e.g. 0.003
    pub fee_fraction: Decimal,
    pub state: PoolState,
}

impl Pool {
    pub fn is_active(&self) -> bool {
        self.state == PoolState::Active
    }

    /// Both sides hold a non-zero reserve
    pub fn has_liquidity(&self) -> bool {
        !self.reserve_a.is_zero() && !self.reserve_b.is_zero()
    }

    /// The token on the other side of the pool, if `token` belongs to it
    pub fn other_token(&self, token: &TokenId) -> Option<&TokenId> {
        if &self.token_a == token {
            Some(&self.token_b)
        } else if &self.token_b == token {
            Some(&self.token_a)
        } else {
            None
        }
    }

    /// Reserves oriented for a swap that sells `token_in`: (reserve_in, reserve_out)
    pub fn reserves_for(&self, token_in: &TokenId) -> Option<(&BigUint, &BigUint)> {
        if &self.token_a == token_in {
            Some((&self.reserve_a, &self.reserve_b))
        } else if &self.token_b == token_in {
            Some((&self.reserve_b, &self.reserve_a))
        } else {
            None
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pool {} | {}: {} | {}: {} | {:?}",
            self.address, self.token_a, self.reserve_a, self.token_b, self.reserve_b, self.state
        )
    }
}

/// Serialize big amounts as base-10 strings so JSON consumers never lose precision.
pub mod serde_amount {
    use num_bigint::BigUint;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(D::Error::custom)
    }
}

/// Same as [`serde_amount`] for sequences of amounts.
pub mod serde_amounts {
    use num_bigint::BigUint;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[BigUint], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BigUint>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| s.trim().parse().map_err(D::Error::custom))
            .collect()
    }
}

/// Optional variant of [`serde_amount`].
pub mod serde_amount_opt {
    use num_bigint::BigUint;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<BigUint>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigUint>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| s.trim().parse().map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_pool() -> Pool {
        Pool {
            address: Address::new("erd1qqqqqqqqqqqqqpgqpool"),
            token_a: TokenId::new("TOK1-1111"),
            token_b: TokenId::new("USDC-1111"),
            reserve_a: BigUint::from(1_000u32),
            reserve_b: BigUint::from(8_000u32),
            total_supply: BigUint::from(1_000u32),
            fee_fraction: Decimal::from_str("0.003").unwrap(),
            state: PoolState::Active,
        }
    }

    #[test]
    fn test_reserves_oriented_by_input_token() {
        let pool = sample_pool();
        let (r_in, r_out) = pool.reserves_for(&TokenId::new("USDC-1111")).unwrap();
        assert_eq!(r_in, &BigUint::from(8_000u32));
        assert_eq!(r_out, &BigUint::from(1_000u32));
        assert!(pool.reserves_for(&TokenId::new("WEGLD-2222")).is_none());
    }

    #[test]
    fn test_other_token() {
        let pool = sample_pool();
        assert_eq!(
            pool.other_token(&TokenId::new("TOK1-1111")),
            Some(&TokenId::new("USDC-1111"))
        );
        assert_eq!(pool.other_token(&TokenId::new("NOPE-0000")), None);
    }

    #[test]
    fn test_pool_amounts_serialize_as_strings() {
        let pool = sample_pool();
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["reserveB"], "8000");
        let parsed: Pool = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, pool);
    }

    #[test]
    fn test_one_unit() {
        assert_eq!(
            Token::new("USDC-1111", 6).one_unit(),
            BigUint::from(1_000_000u32)
        );
    }

    #[test]
    fn test_address_to_bytes() {
        let pair = Address::new("erd1qqqqqqqqqqqqqpgqq67uv84ma3cekpa55l4l68ajzhq8qm3u0n4s20ecvx");
        let bytes = pair.to_bytes().unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(
            hex::encode(&bytes),
            "0000000000000000050006bdc61ebbec719b07b4a7ebfd1fb215c0706e3c7ceb"
        );
        assert!(pair.is_contract());

        // One character changed breaks the checksum
        let corrupted = Address::new("erd1qqqqqqqqqqqqqpgqq67uv84ma3cekpa55l4l68ajzhq8qm3u0n4s20ecvy");
        assert!(corrupted.to_bytes().is_none());
        assert!(Address::new("not-an-address").to_bytes().is_none());
        assert!(!corrupted.is_contract());

        // Wallet accounts do not start with the zeroed prefix
        let wallet = Address::new("erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th");
        assert_eq!(wallet.to_bytes().map(|b| b.len()), Some(32));
        assert!(!wallet.is_contract());
    }

    #[test]
    fn test_network_chain_id() {
        assert_eq!(Network::Mainnet.chain_id(), "1");
        assert_eq!(Network::Testnet.as_str(), "testnet");
    }
}
