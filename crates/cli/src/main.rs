//! Command line interface for the vCash AMM.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;
use vamm_domain::address::Address;
use vamm_domain::math::wad::{from_decimal, to_decimal};
use vamm_engine::views::PoolInfo;
use vamm_simulation::runner::{SimulationSummary, run_simulation};
use vamm_simulation::scenario::ScenarioConfig;

#[derive(Parser)]
#[command(name = "vamm")]
#[command(about = "Single-sided vCash AMM simulator", long_about = None)]
struct Cli {
    /// Scenario JSON; the built-in demo market is used when absent
    #[arg(long, global = true, env = "VAMM_SCENARIO")]
    scenario: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the pools of the scenario market
    Pools,
    /// Quote a swap against the scenario market
    Quote {
        /// Asset paid
        #[arg(long)]
        asset_in: String,

        /// Asset received
        #[arg(long)]
        asset_out: String,

        /// Amount paid, or received with --exact-out
        #[arg(long)]
        amount: Decimal,

        /// Treat the amount as the exact output
        #[arg(long, default_value_t = false)]
        exact_out: bool,
    },
    /// Run the scenario workload
    Simulate {
        /// Override the number of trades
        #[arg(short, long)]
        trades: Option<usize>,

        /// Override the random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Export engine state as versioned JSON
    ExportState {
        /// Trades to run before exporting
        #[arg(short, long, default_value_t = 0)]
        trades: usize,

        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_scenario(path: Option<&PathBuf>) -> Result<ScenarioConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading scenario");
            ScenarioConfig::load(path)
                .with_context(|| format!("failed to load scenario {}", path.display()))
        }
        None => Ok(ScenarioConfig::default()),
    }
}

fn format_timestamp(timestamp: Option<u64>) -> String {
    timestamp
        .and_then(|ts| chrono::DateTime::from_timestamp(i64::try_from(ts).ok()?, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_pools(pools: &[PoolInfo]) {
    let mut table = Table::new();
    table.add_row(row![
        "Asset", "Pid", "Status", "Price", "Tokens", "Debt", "Credit", "Value", "Shares", "Created"
    ]);
    for pool in pools {
        let value = pool
            .pool_value
            .map(|value| format!("{:.2}", to_decimal(value)))
            .unwrap_or_else(|| "insolvent".to_string());
        table.add_row(row![
            pool.asset,
            pool.pid,
            pool.status,
            format!("{:.6}", to_decimal(pool.price)),
            format!("{:.4}", to_decimal(pool.token_balance)),
            format!("{:.2}", to_decimal(pool.vcash_debt)),
            format!("{:.2}", to_decimal(pool.vcash_credit)),
            value,
            pool.total_shares,
            format_timestamp(pool.created_at)
        ]);
    }
    table.printstd();
}

fn print_summary(summary: &SimulationSummary) {
    println!("\n📊 Simulation Results");
    println!("════════════════════════════════════");
    println!("Trades attempted: {}", summary.trades_attempted);
    println!("Trades executed:  {}", summary.trades_executed);
    println!("Volume (vCash):   {:.2}", summary.volume);
    println!("Dev fees (vCash): {:.6}", summary.dev_fees);
    println!("Retained fees:    {:.6}", summary.retained_fees);
    println!("Rebalanced debt:  {:.2}", summary.rebalanced);
    println!("Price updates:    {}", summary.price_updates);
    println!("Blocks:           {} → {}", summary.start_block, summary.end_block);
    println!("Accounting drift: {}", summary.accounting_drift);
    println!("════════════════════════════════════");

    if !summary.failures.is_empty() || !summary.price_update_failures.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["Operation", "Code", "Count"]);
        for (code, count) in &summary.failures {
            table.add_row(row!["swap", code, count]);
        }
        for (code, count) in &summary.price_update_failures {
            table.add_row(row!["price update", code, count]);
        }
        table.printstd();
    }
    print_pools(&summary.pools);
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut scenario = load_scenario(cli.scenario.as_ref())?;

    match &cli.command {
        Commands::Pools => {
            let market = scenario.build()?;
            let pools = market
                .engine
                .pools()
                .map(|pool| market.engine.pool_info(&pool.asset))
                .collect::<Result<Vec<_>, _>>()?;
            print_pools(&pools);
        }
        Commands::Quote {
            asset_in,
            asset_out,
            amount,
            exact_out,
        } => {
            let market = scenario.build()?;
            let (asset_in, asset_out) = (Address::from(asset_in.as_str()), Address::from(asset_out.as_str()));
            let amount = from_decimal(*amount)?;
            let quote = if *exact_out {
                market.engine.quote_amount_in(&asset_in, &asset_out, amount)
            } else {
                market.engine.quote_amount_out(&asset_in, &asset_out, amount)
            }
            .with_context(|| format!("cannot quote {asset_in} → {asset_out}"))?;

            let mut table = Table::new();
            table.add_row(row!["", "Asset", "Amount", "Price after"]);
            table.add_row(row![
                "In",
                quote.asset_in,
                format!("{:.6}", to_decimal(quote.amount_in)),
                format!("{:.6}", to_decimal(quote.asset_in_price))
            ]);
            table.add_row(row![
                "Out",
                quote.asset_out,
                format!("{:.6}", to_decimal(quote.amount_out)),
                format!("{:.6}", to_decimal(quote.asset_out_price))
            ]);
            table.printstd();
            println!("vCash value: {:.6}", to_decimal(quote.vcash_value));
        }
        Commands::Simulate { trades, seed, json } => {
            if let Some(trades) = trades {
                scenario.workload.trades = *trades;
            }
            if let Some(seed) = seed {
                scenario.workload.seed = *seed;
            }
            if !*json {
                println!(
                    "🚀 Running {} trades with seed {}...",
                    scenario.workload.trades, scenario.workload.seed
                );
            }
            let (_, summary) = run_simulation(&scenario)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            if !summary.accounting_drift.is_zero() {
                bail!("vCash accounting drifted by {}", summary.accounting_drift);
            }
        }
        Commands::ExportState { trades, output } => {
            scenario.workload.trades = *trades;
            let (market, _) = run_simulation(&scenario)?;
            let state = serde_json::to_string_pretty(&market.engine.export_state())?;
            match output {
                Some(path) => {
                    std::fs::write(path, state)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("✅ State written to {}", path.display());
                }
                None => println!("{state}"),
            }
        }
    }

    Ok(())
}
