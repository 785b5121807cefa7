//! Auto-Router Constants
//!
//! Contract endpoint names used when encoding transaction data.

/// Router contract endpoints
pub mod router_endpoints {
    /// Aggregated swap across several pairs in one transaction
    pub const MULTI_PAIR_SWAP: &str = "multiPairSwap";
}

/// Pair contract endpoints, one per swap direction
pub mod pair_endpoints {
    pub const SWAP_FIXED_INPUT: &str = "swapTokensFixedInput";
    pub const SWAP_FIXED_OUTPUT: &str = "swapTokensFixedOutput";
}

/// Native currency wrapping contract endpoints
pub mod wrap_endpoints {
    pub const WRAP: &str = "wrapEgld";
    pub const UNWRAP: &str = "unwrapEgld";
}

/// Built-in function that transfers a fungible token along with a call
pub const ESDT_TRANSFER: &str = "ESDTTransfer";

/// Argument separator in transaction data
pub const ARG_SEPARATOR: char = '@';

/// Upper bound on cached quotes before expired entries are purged
pub const QUOTE_CACHE_MAX_ENTRIES: usize = 10_000;
