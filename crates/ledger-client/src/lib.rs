//! ledger-client: Collaborator capabilities for the auto-router
//!
//! Defines the read-only capabilities the router needs from the ledger side
//! (pool snapshot, token metadata, USD prices) and provides an in-memory
//! ledger that serves a consistent snapshot loaded from JSON.

pub mod capabilities;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use router_core::{Pool, ProviderError, Token, TokenId};
use serde::{Deserialize, Serialize};

pub use capabilities::{
    parse_price_usd, PoolSnapshotProvider, TokenMetadataProvider, UsdPriceProvider,
};

/// Result type for ledger reads
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Everything the router reads from the ledger at one point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    /// USD reference prices as decimal strings
    #[serde(default)]
    pub prices_usd: HashMap<TokenId, String>,
}

impl LedgerSnapshot {
    /// Load a snapshot from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ProviderError::Unavailable {
            provider: "ledger snapshot",
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

/// Ledger client serving an in-memory snapshot.
///
/// Implements every collaborator capability; cloning shares the snapshot.
/// Every read sees the same point in time.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    snapshot: Arc<LedgerSnapshot>,
    pool_reads: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            pool_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `list_pools` reads served so far
    pub fn pool_reads(&self) -> usize {
        self.pool_reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PoolSnapshotProvider for InMemoryLedger {
    async fn list_pools(&self) -> Result<Vec<Pool>> {
        self.pool_reads.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(pools = self.snapshot.pools.len(), "Serving pool snapshot");
        Ok(self.snapshot.pools.clone())
    }
}

#[async_trait]
impl TokenMetadataProvider for InMemoryLedger {
    async fn get_token(&self, token_id: &TokenId) -> Result<Token> {
        self.snapshot
            .tokens
            .iter()
            .find(|t| &t.id == token_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                what: format!("token metadata for {}", token_id),
            })
    }
}

#[async_trait]
impl UsdPriceProvider for InMemoryLedger {
    async fn get_price_usd(&self, token_id: &TokenId) -> Result<String> {
        self.snapshot
            .prices_usd
            .get(token_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                what: format!("USD price for {}", token_id),
            })
    }
}
