use anyhow::Result;
use clap::Parser;
use futarchy_arbitrage::{
    arbitrage::ArbitragePlanner,
    cli::{Cli, Command},
    config::{AppConfig, ProposalRegistry},
    dex::PoolClient,
    models::{OutcomeSide, TradeParameters},
    service::ArbitrageService,
    utils,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let Cli { command } = Cli::parse();
    let config = AppConfig::load()?;
    tracing::info!(
        flavor = %config.pool_flavor,
        proposals_file = %config.proposals_file.display(),
        max_tick_crossings = config.planner.max_tick_crossings,
        "[INIT] futarchy-arb starting"
    );

    let registry = ProposalRegistry::from_file(&config.proposals_file)?;
    let client = PoolClient::new(&config.rpc_url, config.pool_flavor)?;
    let service = ArbitrageService::new(client, registry, ArbitragePlanner::new(config.planner));

    match command {
        Command::Plan {
            proposal_id,
            spot_price,
            probability,
            impact,
        } => {
            let params = TradeParameters::new(spot_price, probability, impact);
            let plan = service.plan_arbitrage(&proposal_id, &params).await?;
            for side in [OutcomeSide::Yes, OutcomeSide::No] {
                match plan.side(side) {
                    Ok(trade) => println!("{side}: {trade}"),
                    Err(e) => println!("{side}: skipped ({e})"),
                }
            }
        }
        Command::Quote {
            proposal_id,
            side,
            input,
            amount_in,
        } => {
            let quote = service
                .quote_swap(&proposal_id, side, input.is_asset(), amount_in)
                .await?;
            println!(
                "{side}: in {} (fee {}) -> out {} | price {} -> {} | {} boundaries",
                quote.amount_in,
                quote.fee_amount,
                quote.amount_out,
                quote.start_price.round(8),
                quote.end_price.round(8),
                quote.boundaries_crossed
            );
        }
    }
    Ok(())
}
