//! RPC call statistics
//!
//! Counts calls, failures and latency per method for one client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MethodStats {
    pub calls: u64,
    pub errors: u64,
    pub total_latency_ms: u64,
}

impl MethodStats {
    pub fn average_latency_ms(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            (self.total_latency_ms as f64) / (self.calls as f64)
        }
    }
}

/// Statistics tracking for RPC usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcStats {
    pub calls_per_method: HashMap<String, MethodStats>,
    pub startup_time: DateTime<Utc>,
    pub last_call_time: Option<DateTime<Utc>>,
}

impl Default for RpcStats {
    fn default() -> Self {
        Self {
            calls_per_method: HashMap::new(),
            startup_time: Utc::now(),
            last_call_time: None,
        }
    }
}

impl RpcStats {
    /// Record a finished call to an RPC method
    pub fn record_call(&mut self, method: &str, latency: Duration, success: bool) {
        let entry = self
            .calls_per_method
            .entry(method.to_string())
            .or_default();
        entry.calls += 1;
        entry.total_latency_ms += latency.as_millis() as u64;
        if !success {
            entry.errors += 1;
        }
        self.last_call_time = Some(Utc::now());
    }

    /// Get total calls across all methods
    pub fn total_calls(&self) -> u64 {
        self.calls_per_method.values().map(|s| s.calls).sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.calls_per_method.values().map(|s| s.errors).sum()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            1.0
        } else {
            ((total - self.total_errors()) as f64) / (total as f64)
        }
    }

    /// One line per method, busiest first
    pub fn summary_lines(&self) -> Vec<String> {
        let mut methods: Vec<_> = self.calls_per_method.iter().collect();
        methods.sort_by(|a, b| b.1.calls.cmp(&a.1.calls).then_with(|| a.0.cmp(b.0)));
        methods
            .into_iter()
            .map(|(method, stats)| {
                format!(
                    "{}: {} calls, {} errors, avg {:.1}ms",
                    method,
                    stats.calls,
                    stats.errors,
                    stats.average_latency_ms()
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_and_errors_per_method() {
        let mut stats = RpcStats::default();
        stats.record_call("getBalance", Duration::from_millis(10), true);
        stats.record_call("getBalance", Duration::from_millis(30), false);
        stats.record_call("getTokenAccountsByOwner", Duration::from_millis(50), true);

        assert_eq!(stats.total_calls(), 3);
        assert_eq!(stats.total_errors(), 1);
        assert_eq!(stats.calls_per_method["getBalance"].average_latency_ms(), 20.0);
        assert_eq!(
            stats.summary_lines()[0],
            "getBalance: 2 calls, 1 errors, avg 20.0ms"
        );
    }

    #[test]
    fn empty_stats_report_full_success() {
        assert_eq!(RpcStats::default().success_rate(), 1.0);
    }
}
