//! Logger filter, derived from command-line flags at startup

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::{get_cmd_args, is_quiet_enabled, is_verbose_enabled};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    /// Messages above this level are dropped
    pub min_level: LogLevel,
    /// Tags with `--debug-<tag>` enabled
    pub debug_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
        }
    }
}

impl LoggerConfig {
    /// `--quiet` beats `--verbose`, which beats any `--debug-<tag>`
    pub fn from_args(args: &[String], quiet: bool, verbose: bool) -> Self {
        let debug_tags: HashSet<String> = args
            .iter()
            .filter_map(|a| a.strip_prefix("--debug-"))
            .map(str::to_string)
            .collect();

        let min_level = if quiet {
            LogLevel::Warning
        } else if verbose {
            LogLevel::Verbose
        } else if !debug_tags.is_empty() {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        Self {
            min_level,
            debug_tags,
        }
    }

    /// Errors always pass; debug lines also need their tag enabled unless verbose
    pub fn allows(&self, tag: LogTag, level: LogLevel) -> bool {
        match level {
            LogLevel::Error => true,
            _ if level > self.min_level => false,
            LogLevel::Debug => {
                self.min_level == LogLevel::Verbose || self.debug_tags.contains(tag.to_debug_key())
            }
            _ => true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn init_from_args() {
    let config = LoggerConfig::from_args(&get_cmd_args(), is_quiet_enabled(), is_verbose_enabled());
    *LOGGER_CONFIG.write() = config;
}

pub fn allows(tag: LogTag, level: LogLevel) -> bool {
    LOGGER_CONFIG.read().allows(tag, level)
}
