//! Auto-Router Service
//!
//! Entry point tying the pipeline together: snapshot → graph → candidate
//! routes → simulation → selection → price guard → quote, and quote →
//! transactions.

use std::sync::Arc;
use std::time::Duration;

use ledger_client::{
    parse_price_usd, PoolSnapshotProvider, TokenMetadataProvider, UsdPriceProvider,
};
use router_core::{Address, Result, RouterConfig, RouterError, TokenId};
use rust_decimal::Decimal;

use crate::cache::QuoteCache;
use crate::calculator::{calculate_exchange_rate, denominate_amount};
use crate::constants::QUOTE_CACHE_MAX_ENTRIES;
use crate::price_guard::{check_price_deviation, PricedAmount};
use crate::router::{build_liquidity_graph, find_routes};
use crate::simulation::{select_best_route, simulate_candidates};
use crate::state::{
    AutoRouteResult, Route, SwapDirection, SwapRequest, SwapType, Transaction,
};
use crate::tolerance::{max_amount_in, validate_tolerance};
use crate::tx_builder::TransactionBuilder;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QuoteKey {
    token_in: TokenId,
    token_out: TokenId,
    direction: Option<SwapDirection>,
    tolerance: Decimal,
}

/// DEX auto-router
pub struct AutoRouter {
    config: RouterConfig,
    pools: Arc<dyn PoolSnapshotProvider>,
    tokens: Arc<dyn TokenMetadataProvider>,
    prices: Arc<dyn UsdPriceProvider>,
    tx_builder: TransactionBuilder,
    cache: Option<QuoteCache<QuoteKey, AutoRouteResult>>,
}

impl AutoRouter {
    pub fn new(
        config: RouterConfig,
        pools: Arc<dyn PoolSnapshotProvider>,
        tokens: Arc<dyn TokenMetadataProvider>,
        prices: Arc<dyn UsdPriceProvider>,
    ) -> Self {
        let cache = (config.routing.quote_cache_ttl_secs > 0)
            .then(|| QuoteCache::new(QUOTE_CACHE_MAX_ENTRIES));
        Self {
            tx_builder: TransactionBuilder::new(&config),
            config,
            pools,
            tokens,
            prices,
            cache,
        }
    }

    /// Build a router reading everything from one ledger client
    pub fn from_ledger<L>(config: RouterConfig, ledger: Arc<L>) -> Self
    where
        L: PoolSnapshotProvider + TokenMetadataProvider + UsdPriceProvider + 'static,
    {
        Self::new(config, ledger.clone(), ledger.clone(), ledger)
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolve a swap request into a quote.
    ///
    /// When neither amount is given, quotes one whole unit of token in.
    pub async fn resolve_swap(&self, request: &SwapRequest) -> Result<AutoRouteResult> {
        let direction =
            SwapDirection::from_amounts(request.amount_in.clone(), request.amount_out.clone())?;
        self.quote(
            &request.token_in_id,
            &request.token_out_id,
            direction,
            request.tolerance,
        )
        .await
    }

    /// Quote a swap for an explicit direction (or the default one-unit quote)
    pub async fn quote(
        &self,
        token_in: &TokenId,
        token_out: &TokenId,
        direction: Option<SwapDirection>,
        tolerance: Decimal,
    ) -> Result<AutoRouteResult> {
        if let Some(direction) = &direction {
            direction.validate()?;
        }
        validate_tolerance(tolerance)?;

        let Some(cache) = &self.cache else {
            return self
                .compute_quote(token_in, token_out, direction, tolerance)
                .await;
        };

        let key = QuoteKey {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            direction: direction.clone(),
            tolerance,
        };
        let ttl = Duration::from_secs(self.config.routing.quote_cache_ttl_secs);
        cache
            .get_or_compute(key, ttl, || {
                self.compute_quote(token_in, token_out, direction, tolerance)
            })
            .await
    }

    /// Build the ordered transactions executing `result` for `sender`
    pub fn build_transactions(
        &self,
        sender: &Address,
        result: &AutoRouteResult,
    ) -> Result<Vec<Transaction>> {
        let transactions = self.tx_builder.build_transactions(sender, result)?;
        tracing::info!(
            token_in = %result.token_in_id,
            token_out = %result.token_out_id,
            count = transactions.len(),
            "Built swap transactions"
        );
        Ok(transactions)
    }

    async fn compute_quote(
        &self,
        token_in: &TokenId,
        token_out: &TokenId,
        direction: Option<SwapDirection>,
        tolerance: Decimal,
    ) -> Result<AutoRouteResult> {
        let contracts = &self.config.contracts;
        let route_in = contracts.routing_token(token_in);
        let route_out = contracts.routing_token(token_out);

        // Stage 1: snapshot and token validation
        let pools = self.pools.list_pools().await.map_err(|e| {
            tracing::warn!(error = %e, "Pool snapshot read failed");
            RouterError::from(e)
        })?;
        let graph = build_liquidity_graph(&pools)?;
        for (requested, routed) in [(token_in, &route_in), (token_out, &route_out)] {
            if !graph.is_known(routed) {
                return Err(RouterError::UnknownToken {
                    token: requested.to_string(),
                });
            }
        }
        if !graph.is_routable(&route_in) || !graph.is_routable(&route_out) {
            tracing::debug!(
                token_in = %route_in,
                token_out = %route_out,
                "Token has no usable pool"
            );
            return Err(RouterError::NoRouteFound {
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
            });
        }

        // Stage 2: metadata and reference prices, fail-fast
        let (meta_in, meta_out, raw_price_in, raw_price_out) = tokio::try_join!(
            self.tokens.get_token(&route_in),
            self.tokens.get_token(&route_out),
            self.prices.get_price_usd(&route_in),
            self.prices.get_price_usd(&route_out),
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "Collaborator read failed");
            RouterError::from(e)
        })?;
        let price_in = parse_price_usd(&raw_price_in)?;
        let price_out = parse_price_usd(&raw_price_out)?;

        let direction =
            direction.unwrap_or_else(|| SwapDirection::FixedInput(meta_in.one_unit()));
        let swap_type = direction.swap_type();

        // Stage 3: candidates, simulation, selection
        let routes: Vec<Route> =
            find_routes(&graph, &route_in, &route_out, self.config.routing.max_hops).collect();
        tracing::debug!(
            token_in = %route_in,
            token_out = %route_out,
            candidates = routes.len(),
            "Enumerated candidate routes"
        );
        let candidates = simulate_candidates(&routes, &direction)?;
        let best = select_best_route(candidates, swap_type, token_in, token_out)?;

        // Stage 4: amounts, rates, price guard
        let amount_in = match swap_type {
            SwapType::FixedInput => best.amount_in().clone(),
            SwapType::FixedOutput => max_amount_in(best.amount_in(), tolerance)?,
        };
        let amount_out = best.amount_out().clone();

        let token_in_exchange_rate =
            calculate_exchange_rate(best.amount_in(), best.amount_out(), meta_in.decimals);
        let token_out_exchange_rate =
            calculate_exchange_rate(best.amount_out(), best.amount_in(), meta_out.decimals);

        let max_deviation = self.config.routing.max_price_deviation_percent;
        let tokens_price_deviation_percent = check_price_deviation(
            PricedAmount {
                amount: best.amount_in(),
                decimals: meta_in.decimals,
                price_usd: price_in,
            },
            PricedAmount {
                amount: best.amount_out(),
                decimals: meta_out.decimals,
                price_usd: price_out,
            },
            max_deviation,
        );
        if let Some(deviation) = tokens_price_deviation_percent {
            tracing::warn!(
                route = %best.route,
                deviation = %deviation,
                max = %max_deviation,
                "Quote deviates from USD reference prices"
            );
        }

        tracing::info!(
            token_in = %token_in,
            token_out = %token_out,
            swap_type = %swap_type,
            route = %best.route,
            amount_in = %amount_in,
            amount_out = %amount_out,
            "Resolved swap"
        );

        Ok(AutoRouteResult {
            swap_type,
            token_in_id: token_in.clone(),
            token_out_id: token_out.clone(),
            amount_in,
            amount_out,
            token_in_exchange_rate_denom: denominate_amount(
                &token_in_exchange_rate,
                meta_out.decimals,
            ),
            token_out_exchange_rate_denom: denominate_amount(
                &token_out_exchange_rate,
                meta_in.decimals,
            ),
            token_in_exchange_rate,
            token_out_exchange_rate,
            route: best,
            token_in_price_usd: price_in,
            token_out_price_usd: price_out,
            tolerance,
            max_price_deviation_percent: max_deviation,
            tokens_price_deviation_percent,
        })
    }
}
