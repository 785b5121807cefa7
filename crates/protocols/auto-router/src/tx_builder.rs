//! Swap Transaction Builder
//!
//! Turns a resolved quote into the ordered list of unsigned transactions the
//! user signs.
//!
//! # Transaction Sequence
//!
//! 1. wrap     (only when token in is the native currency)
//! 2. multiPairSwap through the router contract, one hop per pool
//! 3. unwrap   (only when token out is the native currency)
//!
//! The aggregated swap data reads
//! `ESDTTransfer@<token>@<amount>@multiPairSwap` followed by
//! `@<pool>@<endpoint>@<token out>@<limit>` for every hop, all hex encoded.

use num_bigint::BigUint;
use num_traits::Zero;
use router_core::{Address, ContractsConfig, GasConfig, Result, RouterConfig, RouterError};

use crate::constants::{
    pair_endpoints, router_endpoints, wrap_endpoints, ARG_SEPARATOR, ESDT_TRANSFER,
};
use crate::state::{AutoRouteResult, SwapType, Transaction};
use crate::tolerance::{compute_swap_bounds, SwapBounds};

// =============================================================================
// Data Encoding
// =============================================================================

/// Big-endian hex of an amount; zero encodes as an empty argument
fn hex_amount(amount: &BigUint) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        hex::encode(amount.to_bytes_be())
    }
}

fn hex_str(value: &str) -> String {
    hex::encode(value.as_bytes())
}

fn join_call(function: &str, args: &[String]) -> String {
    let mut data = String::from(function);
    for arg in args {
        data.push(ARG_SEPARATOR);
        data.push_str(arg);
    }
    data
}

// =============================================================================
// Builder
// =============================================================================

/// Builds unsigned transactions from resolved quotes
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    contracts: ContractsConfig,
    gas: GasConfig,
    chain_id: String,
}

impl TransactionBuilder {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            contracts: config.contracts.clone(),
            gas: config.gas.clone(),
            chain_id: config.chain_id().to_string(),
        }
    }

    /// Build the full transaction sequence for `result`.
    ///
    /// A malformed result fails with `InvalidRoute` before anything is built.
    pub fn build_transactions(
        &self,
        sender: &Address,
        result: &AutoRouteResult,
    ) -> Result<Vec<Transaction>> {
        self.validate_result(result)?;
        let bounds = compute_swap_bounds(
            result.swap_type,
            result.intermediary_amounts(),
            result.tolerance,
        )?;
        if bounds.amount_in != result.amount_in {
            return Err(RouterError::invalid_route(format!(
                "quoted amount in {} does not match route amount {}",
                result.amount_in, bounds.amount_in
            )));
        }

        let mut transactions = Vec::with_capacity(3);
        if self.contracts.is_native(&result.token_in_id) {
            transactions.push(self.wrap_transaction(sender, &bounds.amount_in));
        }
        transactions.push(self.multi_pair_swap_transaction(sender, result, &bounds)?);
        if self.contracts.is_native(&result.token_out_id) {
            transactions.push(self.unwrap_transaction(sender, result.route.amount_out()));
        }

        tracing::debug!(
            sender = %sender,
            count = transactions.len(),
            hops = result.route.hop_count(),
            "Built swap transactions"
        );
        Ok(transactions)
    }

    fn validate_result(&self, result: &AutoRouteResult) -> Result<()> {
        result.route.route.validate()?;

        let tokens = result.token_route();
        if result.intermediary_amounts().len() != tokens.len() {
            return Err(RouterError::invalid_route(format!(
                "{} intermediary amounts for {} tokens",
                result.intermediary_amounts().len(),
                tokens.len()
            )));
        }

        let route = &result.route.route;
        let expected_in = self.contracts.routing_token(&result.token_in_id);
        let expected_out = self.contracts.routing_token(&result.token_out_id);
        if route.token_in() != Some(&expected_in) || route.token_out() != Some(&expected_out) {
            return Err(RouterError::invalid_route(format!(
                "route {} does not connect {} to {}",
                result.route.route, result.token_in_id, result.token_out_id
            )));
        }
        if let Some(pool) = route.pools.iter().find(|p| !p.address.is_contract()) {
            return Err(RouterError::invalid_route(format!(
                "pool address {} is not a contract",
                pool.address
            )));
        }
        Ok(())
    }

    fn base_transaction(&self, sender: &Address, receiver: &Address) -> Transaction {
        Transaction {
            nonce: 0,
            value: BigUint::zero(),
            receiver: receiver.clone(),
            sender: sender.clone(),
            gas_price: self.gas.gas_price,
            gas_limit: 0,
            data: String::new(),
            chain_id: self.chain_id.clone(),
            version: self.gas.tx_version,
        }
    }

    /// Wrap `amount` of the native currency into its token form
    pub fn wrap_transaction(&self, sender: &Address, amount: &BigUint) -> Transaction {
        Transaction {
            value: amount.clone(),
            gas_limit: self.gas.wrap,
            data: wrap_endpoints::WRAP.to_string(),
            ..self.base_transaction(sender, &self.contracts.wrap_address)
        }
    }

    /// Unwrap `amount` of the wrapped token back to the native currency
    pub fn unwrap_transaction(&self, sender: &Address, amount: &BigUint) -> Transaction {
        let data = join_call(
            ESDT_TRANSFER,
            &[
                hex_str(self.contracts.wrapped_native_token_id.as_str()),
                hex_amount(amount),
                hex_str(wrap_endpoints::UNWRAP),
            ],
        );
        Transaction {
            gas_limit: self.gas.unwrap,
            data,
            ..self.base_transaction(sender, &self.contracts.wrap_address)
        }
    }

    fn multi_pair_swap_transaction(
        &self,
        sender: &Address,
        result: &AutoRouteResult,
        bounds: &SwapBounds,
    ) -> Result<Transaction> {
        let tokens = result.token_route();
        let endpoint = match result.swap_type {
            SwapType::FixedInput => pair_endpoints::SWAP_FIXED_INPUT,
            SwapType::FixedOutput => pair_endpoints::SWAP_FIXED_OUTPUT,
        };

        let mut args = vec![
            hex_str(tokens[0].as_str()),
            hex_amount(&bounds.amount_in),
            hex_str(router_endpoints::MULTI_PAIR_SWAP),
        ];
        for (i, pool) in result.pools().iter().enumerate() {
            let pool_bytes = pool.address.to_bytes().ok_or_else(|| {
                RouterError::invalid_route(format!("pool address {} is not valid", pool.address))
            })?;
            args.push(hex::encode(pool_bytes));
            args.push(hex_str(endpoint));
            args.push(hex_str(tokens[i + 1].as_str()));
            args.push(hex_amount(&bounds.hop_limits[i]));
        }

        let hops = result.route.hop_count() as u64;
        Ok(Transaction {
            gas_limit: hops.saturating_mul(self.gas.multi_pair_swap_per_hop),
            data: join_call(ESDT_TRANSFER, &args),
            ..self.base_transaction(sender, &self.contracts.router_address)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Route, SimulatedRoute};
    use router_core::{Pool, PoolState, TokenId};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const TOK1_USDC: &str = "erd1qqqqqqqqqqqqqpgqq67uv84ma3cekpa55l4l68ajzhq8qm3u0n4s20ecvx";
    const TOK1_USDC_HEX: &str = "0000000000000000050006bdc61ebbec719b07b4a7ebfd1fb215c0706e3c7ceb";
    const TOK1_WEGLD: &str = "erd1qqqqqqqqqqqqqpgqe8m9w7cv2ekdc28q5ahku9x3hcregqpn0n4sum0e3u";
    const TOK1_WEGLD_HEX: &str = "00000000000000000500c9f6577b0c566cdc28e0a76f6e14d1be079400337ceb";
    const SENDER: &str = "erd1qqqqqqqqqqqqqpgqd77fnev2sthnczp2lnfx0y5jdycynjfhzzgq6p3rax";

    fn big(s: &str) -> BigUint {
        BigUint::from_str(s).unwrap()
    }

    fn pool(address: &str, a: &str, b: &str) -> Pool {
        Pool {
            address: Address::new(address),
            token_a: TokenId::new(a),
            token_b: TokenId::new(b),
            reserve_a: big("1000000000000000000"),
            reserve_b: big("800000000000000000000000"),
            total_supply: big("1000"),
            fee_fraction: Decimal::from_str("0.003").unwrap(),
            state: PoolState::Active,
        }
    }

    fn quote(
        token_in: &str,
        token_out: &str,
        tokens: &[&str],
        pools: Vec<Pool>,
        amounts: &[&str],
        swap_type: SwapType,
        amount_in: &str,
    ) -> AutoRouteResult {
        let intermediary_amounts: Vec<BigUint> = amounts.iter().map(|a| big(a)).collect();
        let amount_out = intermediary_amounts[intermediary_amounts.len() - 1].clone();
        AutoRouteResult {
            swap_type,
            token_in_id: TokenId::new(token_in),
            token_out_id: TokenId::new(token_out),
            amount_in: big(amount_in),
            amount_out,
            route: SimulatedRoute {
                route: Route {
                    tokens: tokens.iter().map(|t| TokenId::new(*t)).collect(),
                    pools,
                },
                intermediary_amounts,
            },
            token_in_price_usd: Decimal::ONE,
            token_out_price_usd: Decimal::ONE,
            token_in_exchange_rate: BigUint::zero(),
            token_out_exchange_rate: BigUint::zero(),
            token_in_exchange_rate_denom: "0".to_string(),
            token_out_exchange_rate_denom: "0".to_string(),
            tolerance: Decimal::from_str("0.01").unwrap(),
            max_price_deviation_percent: Decimal::ONE,
            tokens_price_deviation_percent: None,
        }
    }

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(&RouterConfig::default())
    }

    #[test]
    fn test_single_hop_fixed_input() {
        let result = quote(
            "USDC-1111",
            "TOK1-1111",
            &["USDC-1111", "TOK1-1111"],
            vec![pool(TOK1_USDC, "TOK1-1111", "USDC-1111")],
            &["1000000000000000000", "1246248446862"],
            SwapType::FixedInput,
            "1000000000000000000",
        );
        let txs = builder()
            .build_transactions(&Address::new(SENDER), &result)
            .unwrap();

        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.receiver, RouterConfig::default().contracts.router_address);
        assert_eq!(tx.sender, Address::new(SENDER));
        assert!(tx.value.is_zero());
        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.gas_limit, 25_000_000);
        assert_eq!(tx.chain_id, "T");
        assert_eq!(
            tx.data,
            format!(
                "ESDTTransfer@555344432d31313131@0de0b6b3a7640000@6d756c74695061697253776170@{}@73776170546f6b656e734669786564496e707574@544f4b312d31313131@011f435fbf99",
                TOK1_USDC_HEX
            )
        );
    }

    #[test]
    fn test_native_in_wraps_first() {
        let result = quote(
            "EGLD",
            "TOK1-1111",
            &["WEGLD-123456", "TOK1-1111"],
            vec![pool(TOK1_USDC, "TOK1-1111", "WEGLD-123456")],
            &["1000000000000000000", "1246248446862"],
            SwapType::FixedInput,
            "1000000000000000000",
        );
        let txs = builder()
            .build_transactions(&Address::new(SENDER), &result)
            .unwrap();

        assert_eq!(txs.len(), 2);
        let wrap = &txs[0];
        assert_eq!(wrap.receiver, RouterConfig::default().contracts.wrap_address);
        assert_eq!(wrap.value, big("1000000000000000000"));
        assert_eq!(wrap.data, "wrapEgld");
        assert_eq!(wrap.gas_limit, 4_200_000);
        // The swap spends the wrapped token
        assert!(txs[1].data.starts_with("ESDTTransfer@5745474c442d313233343536@"));
    }

    #[test]
    fn test_native_out_unwraps_last() {
        let result = quote(
            "TOK1-1111",
            "EGLD",
            &["TOK1-1111", "WEGLD-123456"],
            vec![pool(TOK1_USDC, "TOK1-1111", "WEGLD-123456")],
            &["1000", "79"],
            SwapType::FixedInput,
            "1000",
        );
        let txs = builder()
            .build_transactions(&Address::new(SENDER), &result)
            .unwrap();

        assert_eq!(txs.len(), 2);
        let unwrap = &txs[1];
        assert_eq!(unwrap.receiver, RouterConfig::default().contracts.wrap_address);
        assert!(unwrap.value.is_zero());
        assert_eq!(
            unwrap.data,
            "ESDTTransfer@5745474c442d313233343536@4f@756e7772617045676c64"
        );
    }

    #[test]
    fn test_fixed_output_uses_raised_input() {
        let result = quote(
            "USDC-1111",
            "TOK1-1111",
            &["USDC-1111", "TOK1-1111"],
            vec![pool(TOK1_USDC, "TOK1-1111", "USDC-1111")],
            &["1000", "50"],
            SwapType::FixedOutput,
            "1010",
        );
        let txs = builder()
            .build_transactions(&Address::new(SENDER), &result)
            .unwrap();
        let data = &txs[0].data;
        // 1010 = 0x03f2, exact output 50 = 0x32 on the last hop
        assert!(data.starts_with("ESDTTransfer@555344432d31313131@03f2@"));
        assert!(data.contains(&hex_str("swapTokensFixedOutput")));
        assert!(data.ends_with("@544f4b312d31313131@32"));
    }

    #[test]
    fn test_fixed_output_multi_hop_then_unwrap() {
        let result = quote(
            "USDC-1111",
            "EGLD",
            &["USDC-1111", "TOK1-1111", "WEGLD-123456"],
            vec![
                pool(TOK1_USDC, "TOK1-1111", "USDC-1111"),
                pool(TOK1_WEGLD, "TOK1-1111", "WEGLD-123456"),
            ],
            &["503014183917413680", "626881033727", "500000000000000000"],
            SwapType::FixedOutput,
            "508044325756587816",
        );
        let txs = builder()
            .build_transactions(&Address::new(SENDER), &result)
            .unwrap();
        assert_eq!(txs.len(), 2);

        let swap = &txs[0];
        assert_eq!(swap.gas_limit, 50_000_000);
        let fixed_output = hex_str("swapTokensFixedOutput");
        // First hop keeps half the tolerance as margin, last hop asks for the exact output
        let expected = [
            "ESDTTransfer",
            "555344432d31313131",
            "070cef9f5edfcf28",
            "6d756c74695061697253776170",
            TOK1_USDC_HEX,
            fixed_output.as_str(),
            "544f4b312d31313131",
            "92afd8b02f",
            TOK1_WEGLD_HEX,
            fixed_output.as_str(),
            "5745474c442d313233343536",
            "06f05b59d3b20000",
        ]
        .join("@");
        assert_eq!(swap.data, expected);

        let unwrap = &txs[1];
        assert_eq!(unwrap.receiver, RouterConfig::default().contracts.wrap_address);
        assert_eq!(
            unwrap.data,
            "ESDTTransfer@5745474c442d313233343536@06f05b59d3b20000@756e7772617045676c64"
        );
    }

    #[test]
    fn test_mismatched_amount_in_rejected() {
        let result = quote(
            "USDC-1111",
            "TOK1-1111",
            &["USDC-1111", "TOK1-1111"],
            vec![pool(TOK1_USDC, "TOK1-1111", "USDC-1111")],
            &["1000", "50"],
            SwapType::FixedOutput,
            "1000",
        );
        let err = builder()
            .build_transactions(&Address::new(SENDER), &result)
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_route");
    }

    #[test]
    fn test_malformed_routes_rejected() {
        let sender = Address::new(SENDER);

        let mut short_amounts = quote(
            "USDC-1111",
            "TOK1-1111",
            &["USDC-1111", "TOK1-1111"],
            vec![pool(TOK1_USDC, "TOK1-1111", "USDC-1111")],
            &["1000", "79"],
            SwapType::FixedInput,
            "1000",
        );
        short_amounts.route.intermediary_amounts.pop();
        assert!(matches!(
            builder().build_transactions(&sender, &short_amounts),
            Err(RouterError::InvalidRoute { .. })
        ));

        let mut empty = short_amounts.clone();
        empty.route.route.pools.clear();
        empty.route.route.tokens.truncate(1);
        assert!(builder().build_transactions(&sender, &empty).is_err());

        let wrong_endpoint = quote(
            "USDC-1111",
            "TOK2-2222",
            &["USDC-1111", "TOK1-1111"],
            vec![pool(TOK1_USDC, "TOK1-1111", "USDC-1111")],
            &["1000", "79"],
            SwapType::FixedInput,
            "1000",
        );
        assert!(matches!(
            builder().build_transactions(&sender, &wrong_endpoint),
            Err(RouterError::InvalidRoute { .. })
        ));

        let wallet_pool = quote(
            "USDC-1111",
            "TOK1-1111",
            &["USDC-1111", "TOK1-1111"],
            vec![pool(
                "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th",
                "TOK1-1111",
                "USDC-1111",
            )],
            &["1000", "79"],
            SwapType::FixedInput,
            "1000",
        );
        assert!(matches!(
            builder().build_transactions(&sender, &wallet_pool),
            Err(RouterError::InvalidRoute { .. })
        ));
    }

    #[test]
    fn test_hex_amount() {
        assert_eq!(hex_amount(&BigUint::zero()), "");
        assert_eq!(hex_amount(&big("255")), "ff");
        assert_eq!(hex_amount(&big("256")), "0100");
    }
}
