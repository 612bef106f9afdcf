/// Log tags identifying the subsystem a message comes from
///
/// Each tag maps to a `--debug-<key>` flag that unlocks its debug output.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Rpc,
    Wallet,
}

impl LogTag {
    /// Key used in the `--debug-<key>` flag
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Rpc => "rpc",
            LogTag::Wallet => "wallet",
        }
    }

    /// Uncolored tag name used in the log file
    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
