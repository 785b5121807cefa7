//! CLI commands

mod swap;

pub use swap::{quote, transactions, SwapArgs, SwapTransactions};
