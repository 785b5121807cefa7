//! DEX Auto-Router
//!
//! Finds the best multi-hop route between two tokens across constant-product
//! pools, bounds it with slippage tolerance and a USD price sanity check, and
//! builds the transactions that execute it.

pub mod cache;
pub mod calculator;
pub mod constants;
pub mod price_guard;
pub mod router;
pub mod service;
pub mod simulation;
pub mod state;
pub mod tolerance;
pub mod tx_builder;

// Re-exports
pub use cache::QuoteCache;
pub use calculator::{
    calculate_exchange_rate, calculate_input, calculate_output, denominate_amount, FeeRatio,
};
pub use price_guard::{check_price_deviation, price_deviation, PriceDeviation, PricedAmount};
pub use router::{build_liquidity_graph, find_routes, LiquidityGraph, PoolEdge, RouteSearch};
pub use service::AutoRouter;
pub use simulation::{select_best_route, simulate_candidates, simulate_route};
pub use state::{
    AutoRouteResult, Route, SimulatedRoute, SwapDirection, SwapRequest, SwapType, Transaction,
};
pub use tolerance::{compute_swap_bounds, SwapBounds};
pub use tx_builder::TransactionBuilder;
