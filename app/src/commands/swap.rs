use auto_router::{AutoRouteResult, AutoRouter, SwapRequest, Transaction};
use clap::Args;
use num_bigint::BigUint;
use router_core::{Address, TokenId};
use rust_decimal::Decimal;
use serde::Serialize;

/// Swap parameters shared by every command
#[derive(Debug, Clone, Args)]
pub struct SwapArgs {
    /// Token sold (the native currency id is accepted)
    #[arg(long)]
    pub token_in: TokenId,

    /// Token bought (the native currency id is accepted)
    #[arg(long)]
    pub token_out: TokenId,

    /// Exact amount sold, in smallest units
    #[arg(long, conflicts_with = "amount_out")]
    pub amount_in: Option<BigUint>,

    /// Exact amount bought, in smallest units
    #[arg(long)]
    pub amount_out: Option<BigUint>,

    /// Slippage tolerance as a fraction, e.g. 0.01 for 1%
    #[arg(long, default_value = "0.01")]
    pub tolerance: Decimal,
}

impl SwapArgs {
    pub fn to_request(&self) -> SwapRequest {
        SwapRequest {
            token_in_id: self.token_in.clone(),
            token_out_id: self.token_out.clone(),
            amount_in: self.amount_in.clone(),
            amount_out: self.amount_out.clone(),
            tolerance: self.tolerance,
        }
    }
}

/// Quote together with the transactions executing it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransactions {
    pub quote: AutoRouteResult,
    pub transactions: Vec<Transaction>,
}

fn describe(err: router_core::RouterError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}]", err, err.error_code())
}

/// Resolve the best route for `args`
pub async fn quote(router: &AutoRouter, args: &SwapArgs) -> anyhow::Result<AutoRouteResult> {
    router.resolve_swap(&args.to_request()).await.map_err(describe)
}

/// Resolve the best route and build its transactions for `sender`
pub async fn transactions(
    router: &AutoRouter,
    sender: &Address,
    args: &SwapArgs,
) -> anyhow::Result<SwapTransactions> {
    let quote = quote(router, args).await?;
    let transactions = router
        .build_transactions(sender, &quote)
        .map_err(describe)?;
    Ok(SwapTransactions {
        quote,
        transactions,
    })
}
