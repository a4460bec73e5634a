//! Deferred collection scheduling
//!
//! Collection is postponed until the host reports idle time (bounded by the
//! idle timeout) or, on hosts without idle signaling, a short flat delay.
//! Either way it runs exactly once and resolves a shared [`ReadyHandle`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::aggregator::SignalAggregator;
use crate::config::SchedulerConfig;
use crate::host::Host;
use crate::types::ClientSignalSnapshot;

/// Outcome of a collection cycle: a snapshot, or `None` when every path failed
pub type ReadyValue = Option<Arc<ClientSignalSnapshot>>;

/// Why the scheduled collection started when it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTrigger {
    /// The host reported idle time
    Idle,
    /// Idle signaling exists but did not fire in time
    IdleTimeout,
    /// The host has no idle signaling
    FallbackDelay,
}

/// Awaitable result of the scheduled collection.
///
/// Cloning is cheap; every clone resolves to the same value.
#[derive(Debug, Clone)]
pub struct ReadyHandle {
    rx: watch::Receiver<Option<ReadyValue>>,
}

impl ReadyHandle {
    fn channel() -> (watch::Sender<Option<ReadyValue>>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self { rx })
    }

    /// Wait for the collection to settle.
    ///
    /// Resolves to `None` if the collection task died before settling.
    pub async fn wait(&self) -> ReadyValue {
        let mut rx = self.rx.clone();
        let value = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone().flatten(),
            Err(_) => None,
        };
        value
    }

    /// The settled value, or `None` while the collection is still pending
    pub fn try_get(&self) -> Option<ReadyValue> {
        self.rx.borrow().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

/// A collection that has been scheduled but may not have run yet
#[derive(Debug)]
pub struct ScheduledCollection {
    ready: ReadyHandle,
    task: JoinHandle<()>,
}

impl ScheduledCollection {
    pub fn ready(&self) -> ReadyHandle {
        self.ready.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Starts the aggregator once, off the critical path
#[derive(Debug, Clone, Default)]
pub struct DeferredScheduler {
    config: SchedulerConfig,
}

impl DeferredScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Spawn the deferred collection. Must be called within a tokio runtime.
    pub fn schedule(&self, aggregator: SignalAggregator) -> ScheduledCollection {
        let (tx, ready) = ReadyHandle::channel();
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            let trigger = wait_for_start(aggregator.host().as_ref(), &config).await;
            log::debug!("starting signal collection ({trigger:?})");
            let value = aggregator.collect().await;
            tx.send_replace(Some(value));
        });

        ScheduledCollection { ready, task }
    }
}

async fn wait_for_start(host: &dyn Host, config: &SchedulerConfig) -> StartTrigger {
    let timeout = config.idle_timeout();
    let Some(signal) = host.idle_signal(timeout) else {
        time::sleep(config.fallback_delay()).await;
        return StartTrigger::FallbackDelay;
    };

    let deadline = Instant::now() + timeout;
    match time::timeout_at(deadline, signal.fired()).await {
        Ok(true) => StartTrigger::Idle,
        Ok(false) => {
            // Notifier dropped without firing; honor the bound anyway
            time::sleep_until(deadline).await;
            StartTrigger::IdleTimeout
        }
        Err(_) => StartTrigger::IdleTimeout,
    }
}
