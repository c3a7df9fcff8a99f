// crates/tqmonitor/src/jobs/poller.rs
//
// Dashboard refresh as a cancellable background task. Active while the
// dashboard is the visible view, suspended (task aborted) otherwise.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::jobs::detail::DetailResolver;
use crate::jobs::model::StatsSnapshot;
use crate::jobs::state::View;

const UPDATE_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Active,
    Suspended,
}

#[derive(Debug, Clone)]
pub struct PollUpdate {
    pub generation: u64,
    pub snapshot: StatsSnapshot,
}

pub struct PollingController {
    resolver: DetailResolver,
    interval: Duration,
    state: PollState,
    generation: u64,
    task: Option<JoinHandle<()>>,
    tx: mpsc::Sender<PollUpdate>,
}

impl PollingController {
    /// Starts suspended. Updates arrive on the returned receiver.
    pub fn new(resolver: DetailResolver, interval: Duration) -> (Self, mpsc::Receiver<PollUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let controller = Self {
            resolver,
            interval,
            state: PollState::Suspended,
            generation: 0,
            task: None,
            tx,
        };
        (controller, rx)
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_view_change(&mut self, view: View) {
        if view == View::Dashboard {
            self.activate();
        } else {
            self.suspend();
        }
    }

    /// Must be called inside a tokio runtime. Fetches immediately, then on
    /// every interval tick. No-op when already active.
    pub fn activate(&mut self) {
        if self.state == PollState::Active {
            return;
        }
        self.spawn_task();
        self.state = PollState::Active;
        debug!(generation = self.generation, "dashboard polling active");
    }

    pub fn suspend(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.state == PollState::Active {
            debug!(generation = self.generation, "dashboard polling suspended");
        }
        self.state = PollState::Suspended;
    }

    /// Manual refresh: restarts the cadence with an immediate fetch.
    /// Ignored while suspended.
    pub fn refresh_now(&mut self) {
        if self.state != PollState::Active {
            return;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.spawn_task();
    }

    /// Only updates from the current activation, while still active, apply.
    pub fn accepts(&self, update: &PollUpdate) -> bool {
        self.state == PollState::Active && update.generation == self.generation
    }

    fn spawn_task(&mut self) {
        self.generation += 1;
        let resolver = self.resolver.clone();
        let interval = self.interval;
        let generation = self.generation;
        let tx = self.tx.clone();

        self.task = Some(tokio::spawn(async move {
            run_poll_loop(resolver, interval, generation, tx).await;
        }));
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_poll_loop(
    resolver: DetailResolver,
    interval: Duration,
    generation: u64,
    tx: mpsc::Sender<PollUpdate>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // first tick completes immediately
        ticker.tick().await;

        match resolver.fetch_stats().await {
            Ok(snapshot) => {
                if tx.send(PollUpdate { generation, snapshot }).await.is_err() {
                    // receiver gone
                    break;
                }
            }
            // stale numbers stay on screen
            Err(e) => warn!(error = %e, "dashboard stats refresh failed"),
        }
    }
}
