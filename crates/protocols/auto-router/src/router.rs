//! Liquidity Graph & Path Finding
//!
//! Builds a token graph from one pool snapshot and enumerates every simple
//! path between two tokens, shortest first.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use num_traits::Zero;
use router_core::{Pool, Result, RouterError, TokenId};

use crate::calculator::FeeRatio;
use crate::state::Route;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An edge in the liquidity graph: one direction through one pool.
#[derive(Debug, Clone)]
pub struct PoolEdge {
    pub pool: Arc<Pool>,
    pub token_in: TokenId,
    pub token_out: TokenId,
}

/// Adjacency-list liquidity graph.
///
/// Only active pools holding both reserves contribute edges, but every token
/// named by any pool in the snapshot is recorded in `known_tokens`.
#[derive(Debug, Clone, Default)]
pub struct LiquidityGraph {
    pub adjacency: BTreeMap<TokenId, Vec<PoolEdge>>,
    pub known_tokens: BTreeSet<TokenId>,
    pub pool_count: usize,
}

impl LiquidityGraph {
    /// Edges leaving `token`, ordered by (neighbour, pool address)
    pub fn neighbors(&self, token: &TokenId) -> &[PoolEdge] {
        self.adjacency
            .get(token)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
    }

    /// Token appears in the snapshot, tradeable or not
    pub fn is_known(&self, token: &TokenId) -> bool {
        self.known_tokens.contains(token)
    }

    /// Token has at least one usable pool
    pub fn is_routable(&self, token: &TokenId) -> bool {
        !self.neighbors(token).is_empty()
    }
}

// ---------------------------------------------------------------------------
// Step 1: Liquidity Graph
// ---------------------------------------------------------------------------

/// Check a pool record for contradictions that make the snapshot untrustworthy.
fn check_pool_integrity(pool: &Pool) -> Result<()> {
    if pool.token_a == pool.token_b {
        return Err(RouterError::data_integrity(format!(
            "pool {} pairs {} with itself",
            pool.address, pool.token_a
        )));
    }
    if FeeRatio::from_fraction(pool.fee_fraction).is_none() {
        return Err(RouterError::data_integrity(format!(
            "pool {} has fee {} outside [0, 1)",
            pool.address, pool.fee_fraction
        )));
    }
    let has_reserves = !pool.reserve_a.is_zero() || !pool.reserve_b.is_zero();
    if pool.total_supply.is_zero() && has_reserves {
        return Err(RouterError::data_integrity(format!(
            "pool {} holds reserves with zero liquidity supply",
            pool.address
        )));
    }
    Ok(())
}

/// Build a liquidity graph from one pool snapshot.
///
/// Rejects the whole snapshot with `DataIntegrity` when a pool address repeats
/// or a pool record is self-contradictory. Paused pools and pools with an
/// empty side are kept out of the adjacency.
pub fn build_liquidity_graph(pools: &[Pool]) -> Result<LiquidityGraph> {
    let mut seen_addresses = HashSet::new();
    let mut graph = LiquidityGraph::default();

    for pool in pools {
        if !seen_addresses.insert(&pool.address) {
            return Err(RouterError::data_integrity(format!(
                "pool address {} listed more than once",
                pool.address
            )));
        }
        check_pool_integrity(pool)?;

        graph.known_tokens.insert(pool.token_a.clone());
        graph.known_tokens.insert(pool.token_b.clone());

        if !pool.is_active() || !pool.has_liquidity() {
            tracing::trace!(pool = %pool.address, "Skipping unusable pool");
            continue;
        }

        let shared = Arc::new(pool.clone());
        graph
            .adjacency
            .entry(pool.token_a.clone())
            .or_default()
            .push(PoolEdge {
                pool: Arc::clone(&shared),
                token_in: pool.token_a.clone(),
                token_out: pool.token_b.clone(),
            });
        graph
            .adjacency
            .entry(pool.token_b.clone())
            .or_default()
            .push(PoolEdge {
                pool: shared,
                token_in: pool.token_b.clone(),
                token_out: pool.token_a.clone(),
            });
        graph.pool_count += 1;
    }

    for edges in graph.adjacency.values_mut() {
        edges.sort_by(|a, b| {
            a.token_out
                .cmp(&b.token_out)
                .then_with(|| a.pool.address.cmp(&b.pool.address))
        });
    }

    tracing::debug!(
        pools = graph.pool_count,
        tokens = graph.known_tokens.len(),
        "Built liquidity graph"
    );
    Ok(graph)
}

// ---------------------------------------------------------------------------
// Step 2: Path Finding
// ---------------------------------------------------------------------------

struct PartialPath<'a> {
    tokens: Vec<&'a TokenId>,
    edges: Vec<&'a PoolEdge>,
}

/// Lazy breadth-first enumeration of simple paths.
///
/// Yields routes in order of hop count; within one hop count the order
/// follows the graph's (neighbour, pool address) edge order, so two runs
/// over the same snapshot yield identical sequences.
pub struct RouteSearch<'a> {
    graph: &'a LiquidityGraph,
    target: TokenId,
    max_hops: usize,
    frontier: VecDeque<PartialPath<'a>>,
    found: VecDeque<Route>,
}

impl<'a> RouteSearch<'a> {
    fn expand(&mut self, partial: PartialPath<'a>) {
        let Some(current) = partial.tokens.last().copied() else {
            return;
        };

        let graph: &'a LiquidityGraph = self.graph;
        for edge in graph.neighbors(current) {
            if partial.tokens.contains(&&edge.token_out) {
                continue;
            }

            if edge.token_out == self.target {
                let mut tokens: Vec<TokenId> =
                    partial.tokens.iter().map(|t| (*t).clone()).collect();
                tokens.push(edge.token_out.clone());
                let mut pools: Vec<Pool> =
                    partial.edges.iter().map(|e| (*e.pool).clone()).collect();
                pools.push((*edge.pool).clone());
                self.found.push_back(Route { tokens, pools });
            } else if partial.edges.len() + 1 < self.max_hops {
                let mut tokens = partial.tokens.clone();
                tokens.push(&edge.token_out);
                let mut edges = partial.edges.clone();
                edges.push(edge);
                self.frontier.push_back(PartialPath { tokens, edges });
            }
        }
    }
}

impl Iterator for RouteSearch<'_> {
    type Item = Route;

    fn next(&mut self) -> Option<Route> {
        loop {
            if let Some(route) = self.found.pop_front() {
                return Some(route);
            }
            let partial = self.frontier.pop_front()?;
            self.expand(partial);
        }
    }
}

/// Enumerate every route from `source` to `target` with at most `max_hops`
/// pools and no repeated token.
///
/// Identical endpoints yield nothing.
pub fn find_routes<'a>(
    graph: &'a LiquidityGraph,
    source: &'a TokenId,
    target: &TokenId,
    max_hops: usize,
) -> RouteSearch<'a> {
    let mut frontier = VecDeque::new();
    if source != target && max_hops > 0 {
        frontier.push_back(PartialPath {
            tokens: vec![source],
            edges: Vec::new(),
        });
    }

    RouteSearch {
        graph,
        target: target.clone(),
        max_hops,
        frontier,
        found: VecDeque::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
