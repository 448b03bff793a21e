//! Inspect memory-2 strategies named on the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use memory_two::{analyze, OracleKind, Strategy, StrategyReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "m2-inspect", about = "Print the state table and analysis of memory-2 strategies")]
struct Args {
    /// Strategies as 16 characters over {c, d}, state id 0 first
    #[arg(required = true)]
    strategies: Vec<String>,

    /// Read each strategy as its integer form (bit i = action at state i, 1 = defect)
    #[arg(long)]
    int: bool,

    /// Negative-cycle oracle used for the defensibility check
    #[arg(long, value_enum, default_value_t = OracleArg::BellmanFord)]
    oracle: OracleArg,

    /// Print one JSON report per line instead of tables
    #[arg(long)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OracleArg {
    BellmanFord,
    FloydWarshall,
}

impl From<OracleArg> for OracleKind {
    fn from(arg: OracleArg) -> Self {
        match arg {
            OracleArg::BellmanFord => OracleKind::BellmanFord,
            OracleArg::FloydWarshall => OracleKind::FloydWarshall,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

/// Validated run configuration
#[derive(Debug, PartialEq, Eq)]
struct InspectConfig {
    strategies: Vec<Strategy>,
    oracle: OracleKind,
    format: OutputFormat,
}

fn parse_strategy(raw: &str, as_int: bool) -> Result<Strategy> {
    if as_int {
        let n: u16 = raw
            .parse()
            .with_context(|| format!("strategy integer {:?} must be in [0, 65535]", raw))?;
        return Ok(Strategy::from_int(n));
    }
    Strategy::from_string(raw).with_context(|| format!("cannot parse strategy {:?}", raw))
}

fn build_config(args: &Args) -> Result<InspectConfig> {
    if args.strategies.is_empty() {
        bail!("no strategies given");
    }
    let strategies = args
        .strategies
        .iter()
        .map(|raw| parse_strategy(raw, args.int))
        .collect::<Result<Vec<_>>>()?;
    Ok(InspectConfig {
        strategies,
        oracle: args.oracle.into(),
        format: if args.json { OutputFormat::Json } else { OutputFormat::Table },
    })
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn render_report(report: &StrategyReport) -> String {
    let destinations: Vec<String> = report.destinations.iter().map(|d| d.to_string()).collect();
    format!(
        "{:#}\ndefensible: {}\nefficient: {} (stationary: {})\n\
         distinguishable: {} (stationary: {})\nself-play destinations: {}\n",
        report.strategy,
        yes_no(report.defensible),
        yes_no(report.efficient),
        yes_no(report.efficient_stationary),
        yes_no(report.distinguishable),
        yes_no(report.distinguishable_stationary),
        destinations.join(" "),
    )
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = build_config(&args)?;
    info!(count = config.strategies.len(), oracle = ?config.oracle, "inspecting strategies");

    for strategy in &config.strategies {
        let report = analyze(strategy, &config.oracle)
            .with_context(|| format!("cannot analyze strategy {}", strategy))?;
        match config.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(&report).context("failed to encode report")?)
            }
            OutputFormat::Table => println!("{}", render_report(&report)),
        }
    }
    Ok(())
}
