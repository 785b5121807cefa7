//! Auto-Router State Types
//!
//! Data structures for swap requests, routes, quotes and built transactions.

use num_bigint::BigUint;
use num_traits::Zero;
use router_core::{serde_amount, serde_amount_opt, serde_amounts};
use router_core::{Address, Pool, RouterError, TokenId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the swap the caller fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapType {
    FixedInput,
    FixedOutput,
}

impl fmt::Display for SwapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedInput => write!(f, "fixed-input"),
            Self::FixedOutput => write!(f, "fixed-output"),
        }
    }
}

/// Swap direction with the amount that was fixed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount")]
pub enum SwapDirection {
    /// Exact amount of token in, maximize token out
    FixedInput(#[serde(with = "serde_amount")] BigUint),
    /// Exact amount of token out, minimize token in
    FixedOutput(#[serde(with = "serde_amount")] BigUint),
}

impl SwapDirection {
    pub fn swap_type(&self) -> SwapType {
        match self {
            Self::FixedInput(_) => SwapType::FixedInput,
            Self::FixedOutput(_) => SwapType::FixedOutput,
        }
    }

    pub fn amount(&self) -> &BigUint {
        match self {
            Self::FixedInput(amount) | Self::FixedOutput(amount) => amount,
        }
    }

    /// Interpret an optional input/output amount pair.
    ///
    /// `Ok(None)` means neither side was given and the caller should quote a
    /// default amount.
    pub fn from_amounts(
        amount_in: Option<BigUint>,
        amount_out: Option<BigUint>,
    ) -> Result<Option<Self>, RouterError> {
        match (amount_in, amount_out) {
            (Some(_), Some(_)) => Err(RouterError::invalid_amount(
                "only one of amount in or amount out may be specified",
            )),
            (Some(amount), None) => Ok(Some(Self::FixedInput(amount))),
            (None, Some(amount)) => Ok(Some(Self::FixedOutput(amount))),
            (None, None) => Ok(None),
        }
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        if self.amount().is_zero() {
            return Err(RouterError::invalid_amount("swap amount must be positive"));
        }
        Ok(())
    }
}

/// Swap request as received from a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub token_in_id: TokenId,
    pub token_out_id: TokenId,
    #[serde(default, with = "serde_amount_opt", skip_serializing_if = "Option::is_none")]
    pub amount_in: Option<BigUint>,
    #[serde(default, with = "serde_amount_opt", skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<BigUint>,
    /// Slippage tolerance as a fraction in [0, 1)
    pub tolerance: Decimal,
}

/// Ordered path of pools: tokens[i] -> tokens[i + 1] through pools[i]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub tokens: Vec<TokenId>,
    pub pools: Vec<Pool>,
}

impl Route {
    pub fn hop_count(&self) -> usize {
        self.pools.len()
    }

    pub fn token_in(&self) -> Option<&TokenId> {
        self.tokens.first()
    }

    pub fn token_out(&self) -> Option<&TokenId> {
        self.tokens.last()
    }

    pub fn pool_addresses(&self) -> Vec<&Address> {
        self.pools.iter().map(|p| &p.address).collect()
    }

    /// Check the structural shape: non-empty, one more token than pools,
    /// every pool joining its two neighbouring tokens, no repeated token.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.pools.is_empty() {
            return Err(RouterError::invalid_route("route has no pools"));
        }
        if self.tokens.len() != self.pools.len() + 1 {
            return Err(RouterError::invalid_route(format!(
                "route has {} tokens for {} pools",
                self.tokens.len(),
                self.pools.len()
            )));
        }
        for (i, pool) in self.pools.iter().enumerate() {
            let joins = pool.other_token(&self.tokens[i]) == Some(&self.tokens[i + 1]);
            if !joins {
                return Err(RouterError::invalid_route(format!(
                    "pool {} does not connect {} and {}",
                    pool.address,
                    self.tokens[i],
                    self.tokens[i + 1]
                )));
            }
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if self.tokens[i + 1..].contains(token) {
                return Err(RouterError::invalid_route(format!(
                    "token {} appears more than once",
                    token
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.tokens.iter().map(|t| t.as_str()).collect();
        write!(f, "{}", tokens.join(" -> "))
    }
}

/// A route with the exact amount entering and leaving every hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedRoute {
    #[serde(flatten)]
    pub route: Route,
    /// `tokens.len()` amounts; [0] enters the first pool, [last] leaves the last
    #[serde(with = "serde_amounts")]
    pub intermediary_amounts: Vec<BigUint>,
}

impl SimulatedRoute {
    pub fn amount_in(&self) -> &BigUint {
        &self.intermediary_amounts[0]
    }

    pub fn amount_out(&self) -> &BigUint {
        &self.intermediary_amounts[self.intermediary_amounts.len() - 1]
    }

    pub fn hop_count(&self) -> usize {
        self.route.hop_count()
    }
}

/// Full quote for a swap request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoRouteResult {
    pub swap_type: SwapType,
    /// Token ids exactly as requested (the native id is kept here)
    pub token_in_id: TokenId,
    pub token_out_id: TokenId,
    /// Amount the user transfers. For fixed-output swaps this already
    /// includes the tolerance margin.
    #[serde(with = "serde_amount")]
    pub amount_in: BigUint,
    #[serde(with = "serde_amount")]
    pub amount_out: BigUint,
    pub route: SimulatedRoute,
    pub token_in_price_usd: Decimal,
    pub token_out_price_usd: Decimal,
    /// Units of token out per whole token in
    #[serde(with = "serde_amount")]
    pub token_in_exchange_rate: BigUint,
    /// Units of token in per whole token out
    #[serde(with = "serde_amount")]
    pub token_out_exchange_rate: BigUint,
    pub token_in_exchange_rate_denom: String,
    pub token_out_exchange_rate_denom: String,
    pub tolerance: Decimal,
    pub max_price_deviation_percent: Decimal,
    /// Set only when the quote strays further from USD reference prices
    /// than `max_price_deviation_percent`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_price_deviation_percent: Option<Decimal>,
}

impl AutoRouteResult {
    pub fn token_route(&self) -> &[TokenId] {
        &self.route.route.tokens
    }

    pub fn pools(&self) -> &[Pool] {
        &self.route.route.pools
    }

    pub fn intermediary_amounts(&self) -> &[BigUint] {
        &self.route.intermediary_amounts
    }
}

/// Unsigned ledger transaction ready to be signed by the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub nonce: u64,
    #[serde(with = "serde_amount")]
    pub value: BigUint,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: String,
    pub chain_id: String,
    pub version: u32,
}
