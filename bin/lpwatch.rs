use std::{fmt::Write, time::Duration};

use anyhow::{bail, Context};
use jemallocator::Jemalloc;
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use lpwatch::{build_networks, Settings, Tracker, TrackingReport};

const USAGE: &str = "usage: lpwatch <owner address> [--json]";

struct Args {
    owner: String,
    json: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut owner = None;
    let mut json = false;

    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else if arg == "-h" || arg == "--help" {
            bail!(USAGE);
        } else if arg.starts_with('-') {
            bail!("unknown flag {arg}\n{USAGE}");
        } else if owner.replace(arg).is_some() {
            bail!("more than one owner address given\n{USAGE}");
        }
    }

    let owner = owner.context(USAGE)?;
    Ok(Args { owner, json })
}

fn render(report: &TrackingReport) -> String {
    let mut out = String::new();

    for p in &report.positions {
        let _ = writeln!(out, "[ {} ({}) ]", p.network, p.nft_token_id);
        let _ = writeln!(out, "-> Pair: {}/{}", p.token0_symbol, p.token1_symbol);
        let _ = writeln!(out, "-> Price: {:.7}/{:.7}", p.price0, p.price1);
        let _ = writeln!(out, "-> Liquidity: {:.5}/{:.5}", p.liquidity0_amount, p.liquidity1_amount);
        let _ = writeln!(out, "-> Fees: {:.5}/{:.5}", p.fee0_amount, p.fee1_amount);
        let _ = writeln!(out, "-> $ Liquidity: ${:.2}", p.liquidity_in_usd);
        let _ = writeln!(out, "-> $ Fees: ${:.2}", p.fee_in_usd);
        let _ = writeln!(out, "-> $ Total: ${:.2}", p.total_usd);
        out.push('\n');
    }

    let _ = writeln!(out, "[ TOTAL ]");
    let _ = writeln!(out, "--> $ Fees: ${:.2}", report.total_fee_in_usd);
    let _ = writeln!(out, "--> $ Locked: ${:.2}", report.total_locked_in_usd);
    let _ = writeln!(out, "--> $ Awaited: ${:.2}", report.total_awaited_in_usd);
    let _ = writeln!(out, "--> $ Balance: ${:.2}", report.total_balance_in_usd);
    let _ = writeln!(out, "--> $ Total: ${:.2}", report.total_usd());

    out
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .context("Failed to initialise logger")?;

    let args = parse_args()?;

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load settings. Please set L1_RPC_URL and ARBITRUM_RPC_URL")?;

    let networks = build_networks(&settings).context("Failed to connect networks")?;
    let tracker = Tracker::new(settings.tracker.clone());
    let request_timeout = Duration::from_secs(settings.tracker.request_timeout_secs);

    info!("Tracking positions of {} on {} networks", args.owner, networks.len());

    let request = tokio::time::timeout(request_timeout, tracker.track_positions(&networks, &args.owner));

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    #[cfg(unix)]
    let result = tokio::select! {
        result = request => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal (Ctrl+C), abandoning request");
            return Ok(());
        },
        _ = sigterm_stream.recv() => {
            warn!("Received SIGTERM, abandoning request");
            return Ok(());
        },
    };

    #[cfg(not(unix))]
    let result = tokio::select! {
        result = request => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal (Ctrl+C), abandoning request");
            return Ok(());
        },
    };

    let report = result
        .with_context(|| format!("Tracking request timed out after {request_timeout:?}"))?
        .context("Failed to track positions")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(&report));
    }

    Ok(())
}
