use crate::domain_port::Navigator;
use crate::session::TokenRefresher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    Refreshed,
    /// The previous tick is still running.
    SkippedBusy,
    /// Nobody is signed in.
    SkippedNoToken,
    /// Backend unreachable; the session is kept for the next tick.
    NetworkError,
    /// The refresh token was refused, the user was sent to the login page.
    SessionEnded,
}

/// Background task renewing the access token ahead of its expiry.
///
/// Ticks never overlap: a tick that finds the previous one still in flight
/// is dropped, not queued.
pub struct Refresher {
    refresher: Arc<TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    interval: Duration,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Refresher {
    pub fn new(
        refresher: Arc<TokenRefresher>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            refresher,
            navigator,
            login_path: login_path.into(),
            interval,
            busy: AtomicBool::new(false),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn tick(&self) -> TickOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("refresh tick skipped, previous tick still running");
            return TickOutcome::SkippedBusy;
        }
        let _busy = BusyGuard(&self.busy);

        let tokens = self.refresher.tokens();
        if tokens.refresh_token().is_none() {
            tracing::trace!("refresh tick skipped, no refresh token");
            return TickOutcome::SkippedNoToken;
        }

        match self.refresher.refresh().await {
            Ok(_) => TickOutcome::Refreshed,
            Err(e) if e.is_terminal() => {
                tracing::warn!("scheduled refresh failed, redirecting to login: {}", e);
                tokens.clear();
                self.navigator.navigate(&self.login_path);
                TickOutcome::SessionEnded
            }
            Err(e) => {
                tracing::warn!("scheduled refresh failed, will retry next tick: {}", e);
                TickOutcome::NetworkError
            }
        }
    }

    /// Ticks right away, then every `interval`, until `cancel` fires.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "refresher started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("refresher shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    let this = self.clone();
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {}
                            _ = this.tick() => {}
                        }
                    });
                }
            }
        }
    }
}
