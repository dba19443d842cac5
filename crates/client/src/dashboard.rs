//! Background refresh of the admin dashboard summaries.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use bazaar_orders::{AnalyticsSummary, FinancialSummary};

use crate::api::MarketplaceApi;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Financial and analytics figures fetched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub financial: FinancialSummary,
    pub analytics: AnalyticsSummary,
    pub fetched_at: DateTime<Utc>,
}

/// Re-fetches the summaries on an interval and publishes them through a
/// watch channel. A failed fetch is logged and the previous snapshot stays.
pub struct DashboardPoller {
    api: Arc<dyn MarketplaceApi>,
    interval: Duration,
}

impl DashboardPoller {
    pub fn new(api: Arc<dyn MarketplaceApi>, interval: Duration) -> Self {
        Self { api, interval }
    }

    pub fn from_config(api: Arc<dyn MarketplaceApi>, config: &ClientConfig) -> Self {
        Self::new(api, config.dashboard_refresh)
    }

    pub async fn fetch(api: &dyn MarketplaceApi) -> ClientResult<DashboardSnapshot> {
        let (financial, analytics) =
            tokio::try_join!(api.financial_summary(), api.analytics_summary())?;
        Ok(DashboardSnapshot {
            financial,
            analytics,
            fetched_at: Utc::now(),
        })
    }

    /// Start polling. The first fetch happens immediately.
    pub fn spawn(self) -> DashboardHandle {
        let (tx, rx) = watch::channel(None);
        let refresh = Arc::new(Notify::new());
        let shutdown = Arc::new(Notify::new());

        let task = {
            let refresh = refresh.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                tracing::info!(interval_secs = self.interval.as_secs(), "dashboard poller started");

                let mut ticker = tokio::time::interval(self.interval);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

                loop {
                    tokio::select! {
                        _ = shutdown.notified() => break,
                        _ = refresh.notified() => {
                            tracing::debug!("manual dashboard refresh");
                        }
                        _ = ticker.tick() => {}
                    }

                    match Self::fetch(self.api.as_ref()).await {
                        Ok(snapshot) => {
                            tx.send_replace(Some(snapshot));
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                "dashboard refresh failed; keeping previous snapshot"
                            );
                        }
                    }
                }

                tracing::info!("dashboard poller stopped");
            })
        };

        DashboardHandle {
            snapshots: rx,
            refresh,
            shutdown,
            task,
        }
    }
}

/// Handle to a running [`DashboardPoller`].
pub struct DashboardHandle {
    snapshots: watch::Receiver<Option<DashboardSnapshot>>,
    refresh: Arc<Notify>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardSnapshot>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Option<DashboardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Fetch now instead of waiting for the next tick.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Stop the poller and wait for it to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "dashboard poller task failed");
        }
    }
}
