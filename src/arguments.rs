/// Centralized argument handling for the balance aggregator
///
/// Stores the process arguments once and answers debug flag queries for the
/// logger and the CLI. Subcommand parsing itself lives in main.rs (clap);
/// these helpers only look for the global `--debug-*`, `--verbose` and
/// `--quiet` switches, which clap accepts as global flags.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// RPC transport debug mode
pub fn is_debug_rpc_enabled() -> bool {
    has_arg("--debug-rpc")
}

/// Wallet aggregation debug mode
pub fn is_debug_wallet_enabled() -> bool {
    has_arg("--debug-wallet")
}

/// Configuration loading debug mode
pub fn is_debug_config_enabled() -> bool {
    has_arg("--debug-config")
}

/// Verbose logging for every tag
pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

/// Only warnings and errors
pub fn is_quiet_enabled() -> bool {
    has_arg("--quiet")
}

/// Gets a list of all enabled debug modes
pub fn get_enabled_debug_modes() -> Vec<&'static str> {
    let mut modes = Vec::new();

    if is_debug_rpc_enabled() {
        modes.push("rpc");
    }
    if is_debug_wallet_enabled() {
        modes.push("wallet");
    }
    if is_debug_config_enabled() {
        modes.push("config");
    }
    if is_verbose_enabled() {
        modes.push("verbose");
    }

    modes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_lookup_reads_overridden_args() {
        set_cmd_args(vec![
            "defai".to_string(),
            "--config".to_string(),
            "wallet.json".to_string(),
            "--debug-rpc".to_string(),
        ]);

        assert!(is_debug_rpc_enabled());
        assert!(!is_debug_wallet_enabled());
        assert!(has_arg("wallet.json"));
        assert_eq!(get_enabled_debug_modes(), vec!["rpc"]);
    }
}
