use embassy_time::{Duration, Instant};

use crate::{config::SYNC_INTERVAL_MS, record::ConfigRecord, slave_com::Master};

/// Resend period when nothing changed
pub const SYNC_INTERVAL: Duration = Duration::from_millis(SYNC_INTERVAL_MS);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncState {
    Idle,
    /// A change or the resend timer is waiting on a successful send
    PendingSync,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Skipped,
    Sent,
    Failed,
}

/// Pushes the master's config to the slave half whenever it changes, and at
/// least once every [`SYNC_INTERVAL`] while it doesn't.
#[derive(Copy, Clone, Debug)]
pub struct SyncEngine {
    state: SyncState,
    last_sent: Option<ConfigRecord>,
    last_sync: Option<Instant>,
    interval: Duration,
}

impl SyncEngine {
    pub const fn new() -> Self {
        Self::with_interval(SYNC_INTERVAL)
    }

    pub const fn with_interval(interval: Duration) -> Self {
        Self {
            state: SyncState::Idle,
            last_sent: None,
            last_sync: None,
            interval,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Record the slave holds as of the last successful send
    pub fn last_sent(&self) -> Option<&ConfigRecord> {
        self.last_sent.as_ref()
    }

    fn needs_sync(&self, live: &ConfigRecord, now: Instant) -> bool {
        if self.last_sent.as_ref() != Some(live) {
            return true;
        }
        match self.last_sync {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed >= self.interval),
        }
    }

    /// One background tick. Sends at most once. A failed send leaves the
    /// engine pending and the timer untouched, so the next tick retries.
    pub async fn tick<T: Master>(
        &mut self,
        live: &ConfigRecord,
        now: Instant,
        transport: &mut T,
    ) -> TickOutcome {
        if self.state == SyncState::Idle && self.needs_sync(live, now) {
            self.state = SyncState::PendingSync;
        }
        if self.state == SyncState::Idle {
            return TickOutcome::Skipped;
        }

        match transport.send_config(&live.encode()).await {
            Ok(()) => {
                self.last_sent = Some(*live);
                self.last_sync = Some(now);
                self.state = SyncState::Idle;
                TickOutcome::Sent
            }
            Err(_) => {
                debug!("Config sync failed, retrying next tick");
                TickOutcome::Failed
            }
        }
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}
