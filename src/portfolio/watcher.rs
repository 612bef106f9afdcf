/// Latest-wins holdings refresh
///
/// Callers that refresh repeatedly (polling, wallet switches) must never let a
/// slow answer for an old wallet overwrite a newer one. Every `refresh` bumps
/// a generation counter and cancels the refresh it replaces; only a result
/// whose generation is still current is applied.
use super::aggregator::TokenBalanceAggregator;
use super::holdings::HoldingsSnapshot;
use crate::errors::AggregatorError;
use crate::logger::{self, LogTag};
use crate::rpc::short_address;
use crate::shutdown::CancellationSignal;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug)]
pub enum RefreshOutcome {
    /// Result applied; `latest()` now returns this snapshot
    Updated(HoldingsSnapshot),
    /// This refresh was current when it failed
    Failed(AggregatorError),
    /// A newer refresh (or an explicit cancel) replaced this one; nothing applied
    Superseded,
}

pub struct HoldingsWatcher {
    aggregator: Arc<TokenBalanceAggregator>,
    generation: AtomicU64,
    in_flight: Mutex<Option<Arc<CancellationSignal>>>,
    latest: RwLock<Option<HoldingsSnapshot>>,
}

impl HoldingsWatcher {
    pub fn new(aggregator: Arc<TokenBalanceAggregator>) -> Self {
        Self {
            aggregator,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            latest: RwLock::new(None),
        }
    }

    /// Last applied snapshot
    pub fn latest(&self) -> Option<HoldingsSnapshot> {
        self.latest.read().clone()
    }

    /// Start a new generation, cancelling whatever refresh is in flight
    fn begin(&self) -> (u64, Arc<CancellationSignal>) {
        let signal = Arc::new(CancellationSignal::new());
        let mut in_flight = self.in_flight.lock();
        if let Some(previous) = in_flight.replace(signal.clone()) {
            previous.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, signal)
    }

    /// Drop the in-flight refresh without starting another
    pub fn cancel_in_flight(&self) {
        let mut in_flight = self.in_flight.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = in_flight.take() {
            previous.cancel();
        }
    }

    pub async fn refresh(&self, wallet: &str) -> RefreshOutcome {
        let (generation, signal) = self.begin();
        let result = self.aggregator.aggregate(wallet, &signal).await;

        let mut in_flight = self.in_flight.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            logger::debug(
                LogTag::Wallet,
                &format!(
                    "Discarding refresh #{} for {}: superseded",
                    generation,
                    short_address(wallet)
                ),
            );
            return RefreshOutcome::Superseded;
        }
        in_flight.take();

        match result {
            Ok(holdings) => {
                let snapshot = HoldingsSnapshot::new(wallet, holdings);
                *self.latest.write() = Some(snapshot.clone());
                RefreshOutcome::Updated(snapshot)
            }
            Err(e) => RefreshOutcome::Failed(e),
        }
    }

    /// Refresh `wallet` every `interval` until `shutdown` is notified
    pub async fn run<F>(
        self: Arc<Self>,
        wallet: String,
        interval: Duration,
        shutdown: Arc<Notify>,
        mut on_update: F,
    ) where
        F: FnMut(&RefreshOutcome),
    {
        logger::info(
            LogTag::Wallet,
            &format!(
                "Watching {} every {}s",
                short_address(&wallet),
                interval.as_secs()
            ),
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    break;
                }

                _ = ticker.tick() => {
                    tokio::select! {
                        _ = shutdown.notified() => {
                            self.cancel_in_flight();
                            break;
                        }
                        outcome = self.refresh(&wallet) => {
                            if let RefreshOutcome::Failed(e) = &outcome {
                                logger::warning(
                                    LogTag::Wallet,
                                    &format!("Refresh failed for {}: {}", short_address(&wallet), e),
                                );
                            }
                            on_update(&outcome);
                        }
                    }
                }
            }
        }

        logger::info(LogTag::Wallet, "Watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rpc::mock::MockTransport;
    use crate::rpc::RpcError;

    const WALLET_A: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const WALLET_B: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

    fn watcher(mock: MockTransport) -> Arc<HoldingsWatcher> {
        let mut config = Config::default();
        config.prices.insert("SOL", 20.0);
        let aggregator = TokenBalanceAggregator::with_transport(Arc::new(mock), &config);
        Arc::new(HoldingsWatcher::new(Arc::new(aggregator)))
    }

    #[tokio::test]
    async fn refresh_applies_latest_snapshot() {
        let watcher = watcher(MockTransport::new().with_balance(1_000_000_000));

        match watcher.refresh(WALLET_A).await {
            RefreshOutcome::Updated(snapshot) => assert_eq!(snapshot.total_value, 20.0),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(watcher.latest().unwrap().wallet, WALLET_A);
    }

    #[tokio::test]
    async fn slow_refresh_for_previous_wallet_is_discarded() {
        let watcher = watcher(
            MockTransport::new()
                .with_balance(1_000_000_000)
                .with_delay_for(WALLET_A, Duration::from_millis(500)),
        );

        let slow = {
            let watcher = watcher.clone();
            tokio::spawn(async move { watcher.refresh(WALLET_A).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fast = watcher.refresh(WALLET_B).await;
        assert!(matches!(fast, RefreshOutcome::Updated(_)));

        let slow = slow.await.unwrap();
        assert!(matches!(slow, RefreshOutcome::Superseded), "{:?}", slow);
        assert_eq!(watcher.latest().unwrap().wallet, WALLET_B);
    }

    #[tokio::test]
    async fn failure_keeps_previous_snapshot() {
        let watcher = watcher(MockTransport::new().with_balance(1_000_000_000));
        watcher.refresh(WALLET_A).await;

        let failing = {
            let mut config = Config::default();
            config.prices.insert("SOL", 20.0);
            let mock = MockTransport::new().with_error(
                "getBalance",
                RpcError::HttpStatus {
                    status: 503,
                    body: String::new(),
                },
            );
            HoldingsWatcher {
                aggregator: Arc::new(TokenBalanceAggregator::with_transport(Arc::new(mock), &config)),
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
                latest: RwLock::new(watcher.latest()),
            }
        };

        match failing.refresh(WALLET_A).await {
            RefreshOutcome::Failed(e) => assert!(e.is_rpc_unavailable()),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(failing.latest().unwrap().total_value, 20.0);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let watcher = watcher(MockTransport::new().with_balance(1_000_000_000));
        let shutdown = Arc::new(Notify::new());
        let updates = Arc::new(Mutex::new(0usize));

        let handle = {
            let updates = updates.clone();
            tokio::spawn(watcher.clone().run(
                WALLET_A.to_string(),
                Duration::from_millis(20),
                shutdown.clone(),
                move |outcome| {
                    if matches!(outcome, RefreshOutcome::Updated(_)) {
                        *updates.lock() += 1;
                    }
                },
            ))
        };

        tokio::time::sleep(Duration::from_millis(90)).await;
        shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("watcher should stop")
            .unwrap();

        assert!(*updates.lock() >= 2);
        assert!(watcher.latest().is_some());
    }
}
