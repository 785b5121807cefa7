use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dex_router::init_tracing();
    dex_router::run(dex_router::Cli::parse()).await
}
