use clap::{Arg, ArgAction, ArgMatches, Command};
use defai::{
    arguments::get_enabled_debug_modes,
    config::Config,
    constants::DEFAULT_WATCH_INTERVAL_SECS,
    errors::AggregatorError,
    logger::{self, LogTag},
    portfolio::{
        format_summary, render_holdings_table, HoldingsSnapshot, HoldingsWatcher,
        RefreshOutcome, TokenBalanceAggregator,
    },
    rpc::{mask_url, HttpRpcClient},
    shutdown::CancellationSignal,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const EXIT_INVALID_ADDRESS: i32 = 2;
const EXIT_RPC_UNAVAILABLE: i32 = 3;
const EXIT_CANCELLED: i32 = 130;

fn cli() -> Command {
    Command::new("defai")
        .version(env!("CARGO_PKG_VERSION"))
        .about("DeFAI wallet balance aggregator")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("JSON config file (defaults to DEFAI_* environment variables)"),
        )
        .arg(global_flag("debug-rpc", "Log RPC requests and responses"))
        .arg(global_flag("debug-wallet", "Log aggregation details"))
        .arg(global_flag("debug-config", "Log configuration loading"))
        .arg(global_flag("verbose", "Log everything"))
        .arg(global_flag("quiet", "Only log warnings and errors"))
        .subcommand_required(true)
        .subcommand(
            Command::new("balances")
                .about("Show current holdings of a wallet")
                .arg(wallet_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print holdings as JSON"),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Refresh holdings of a wallet until interrupted")
                .arg(wallet_arg())
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("30")
                        .help("Seconds between refreshes"),
                ),
        )
}

fn global_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .global(true)
        .help(help)
}

fn wallet_arg() -> Arg {
    Arg::new("wallet")
        .value_name("WALLET")
        .help("Base58 wallet address")
        .required(true)
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    match matches.get_one::<String>("config") {
        Some(path) => Config::load(path),
        None => Config::from_env(),
    }
}

fn exit_code(error: &AggregatorError) -> i32 {
    match error {
        AggregatorError::InvalidAddress { .. } => EXIT_INVALID_ADDRESS,
        AggregatorError::RpcUnavailable(_) => EXIT_RPC_UNAVAILABLE,
        AggregatorError::Cancelled => EXIT_CANCELLED,
    }
}

fn print_snapshot(snapshot: &HoldingsSnapshot) {
    println!("{}", render_holdings_table(&snapshot.holdings));
    println!("{}", format_summary(snapshot));
}

async fn run_balances(aggregator: TokenBalanceAggregator, wallet: &str, as_json: bool) -> i32 {
    let cancel = Arc::new(CancellationSignal::new());
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            logger::warning(LogTag::System, &format!("Could not install Ctrl+C handler: {}", e));
        }
    }

    match aggregator.aggregate(wallet, &cancel).await {
        Ok(holdings) => {
            let snapshot = HoldingsSnapshot::new(wallet, holdings);
            if as_json {
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        logger::error(LogTag::System, &format!("Failed to serialize holdings: {}", e));
                        return 1;
                    }
                }
            } else {
                print_snapshot(&snapshot);
            }
            0
        }
        Err(e) => {
            logger::error(LogTag::Wallet, &e.to_string());
            exit_code(&e)
        }
    }
}

async fn run_watch(aggregator: TokenBalanceAggregator, wallet: String, interval: Duration) -> i32 {
    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || shutdown.notify_one()) {
            logger::error(LogTag::System, &format!("Could not install Ctrl+C handler: {}", e));
            return 1;
        }
    }

    let watcher = Arc::new(HoldingsWatcher::new(Arc::new(aggregator)));
    let mut invalid_address = false;

    watcher
        .run(wallet, interval, shutdown.clone(), |outcome| match outcome {
            RefreshOutcome::Updated(snapshot) => print_snapshot(snapshot),
            RefreshOutcome::Failed(e) if e.is_invalid_address() => {
                logger::error(LogTag::Wallet, &e.to_string());
                invalid_address = true;
                shutdown.notify_one();
            }
            RefreshOutcome::Failed(_) | RefreshOutcome::Superseded => {}
        })
        .await;

    if invalid_address {
        EXIT_INVALID_ADDRESS
    } else {
        0
    }
}

/// Per-method call counts and latency, shown with --debug-rpc
fn log_rpc_stats(client: &HttpRpcClient) {
    let stats = client.stats();
    logger::debug(
        LogTag::Rpc,
        &format!(
            "{} RPC calls to {}, {:.0}% ok",
            stats.total_calls(),
            mask_url(client.url()),
            stats.success_rate() * 100.0
        ),
    );
    for line in stats.summary_lines() {
        logger::debug(LogTag::Rpc, &format!("  {}", line));
    }
}

#[tokio::main]
async fn main() {
    logger::init();

    let matches = cli().get_matches();

    let modes = get_enabled_debug_modes();
    if !modes.is_empty() {
        logger::debug(
            LogTag::System,
            &format!("Debug modes enabled: {}", modes.join(", ")),
        );
    }

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::Config, &format!("{:#}", e));
            logger::flush();
            std::process::exit(1);
        }
    };

    let client = match HttpRpcClient::new(&config.rpc_url, config.request_timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            logger::error(
                LogTag::Rpc,
                &format!("Failed to create RPC client for {}: {}", mask_url(&config.rpc_url), e),
            );
            logger::flush();
            std::process::exit(1);
        }
    };

    let aggregator = TokenBalanceAggregator::with_transport(client.clone(), &config);

    let code = match matches.subcommand() {
        Some(("balances", sub)) => {
            let wallet = sub.get_one::<String>("wallet").cloned().unwrap_or_default();
            run_balances(aggregator, &wallet, sub.get_flag("json")).await
        }
        Some(("watch", sub)) => {
            let wallet = sub.get_one::<String>("wallet").cloned().unwrap_or_default();
            let interval = sub
                .get_one::<u64>("interval")
                .copied()
                .unwrap_or(DEFAULT_WATCH_INTERVAL_SECS);
            run_watch(aggregator, wallet, Duration::from_secs(interval)).await
        }
        _ => 1,
    };

    log_rpc_stats(&client);
    logger::flush();
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn watch_parses_interval_and_global_flags() {
        let matches = cli()
            .try_get_matches_from([
                "defai",
                "watch",
                "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
                "--interval",
                "10",
                "--debug-rpc",
            ])
            .unwrap();

        assert!(matches.get_flag("debug-rpc"));
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "watch");
        assert_eq!(sub.get_one::<u64>("interval"), Some(&10));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = cli().try_get_matches_from(["defai", "watch", "wallet", "--interval", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn exit_codes_distinguish_error_kinds() {
        assert_eq!(exit_code(&AggregatorError::invalid_address("x", "bad")), EXIT_INVALID_ADDRESS);
        assert_eq!(exit_code(&AggregatorError::Cancelled), EXIT_CANCELLED);
    }
}
