//! Collaborator capabilities
//!
//! Each external read the router depends on is a separate small trait, so a
//! single ledger client can implement all of them while tests substitute any
//! one in isolation.

use std::str::FromStr;

use async_trait::async_trait;
use router_core::{Pool, ProviderError, Token, TokenId};
use rust_decimal::Decimal;

/// Point-in-time view of every known pool.
///
/// All pools returned by one call must reflect the same ledger state.
#[async_trait]
pub trait PoolSnapshotProvider: Send + Sync {
    async fn list_pools(&self) -> Result<Vec<Pool>, ProviderError>;
}

/// Token metadata (decimals)
#[async_trait]
pub trait TokenMetadataProvider: Send + Sync {
    async fn get_token(&self, token_id: &TokenId) -> Result<Token, ProviderError>;
}

/// Independent USD reference prices, returned as decimal strings
#[async_trait]
pub trait UsdPriceProvider: Send + Sync {
    async fn get_price_usd(&self, token_id: &TokenId) -> Result<String, ProviderError>;
}

/// Parse a USD price string returned by a [`UsdPriceProvider`]
pub fn parse_price_usd(raw: &str) -> Result<Decimal, ProviderError> {
    let price = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| ProviderError::ParseError(format!("invalid USD price '{}': {}", raw, e)))?;

    if price.is_sign_negative() {
        return Err(ProviderError::ParseError(format!(
            "negative USD price '{}'",
            raw
        )));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_usd() {
        assert_eq!(parse_price_usd("200").unwrap(), Decimal::from(200));
        assert_eq!(parse_price_usd(" 0.5 ").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_price_usd("1e-3").unwrap(), Decimal::new(1, 3));
    }

    #[test]
    fn test_parse_price_usd_rejects_garbage() {
        assert!(matches!(
            parse_price_usd("abc"),
            Err(ProviderError::ParseError(_))
        ));
        assert!(parse_price_usd("-1").is_err());
    }
}
