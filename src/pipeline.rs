//! Collector orchestration
//!
//! This module provides the public entry points. [`SignalCollector`] is the
//! single owned context for one page lifetime: it holds the published
//! snapshot slot, the ready handle and the behavior record, and keeps the
//! devtools sampler running until it is dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::aggregator::{SignalAggregator, SignalState};
use crate::behavior::{spawn_devtools_sampler, BehaviorMonitor, BehaviorRecord, PageEvent};
use crate::config::CollectorConfig;
use crate::host::Host;
use crate::scheduler::{DeferredScheduler, ReadyHandle, ReadyValue, ScheduledCollection};
use crate::types::ClientSignalSnapshot;

/// Collect client signals once (deferred as usual) and wait for the result.
///
/// # Example
/// ```ignore
/// let snapshot = collect_signals(Arc::new(host), &CollectorConfig::default()).await;
/// ```
pub async fn collect_signals(host: Arc<dyn Host>, config: &CollectorConfig) -> ReadyValue {
    let state = Arc::new(SignalState::new());
    let aggregator = SignalAggregator::new(host, state);
    DeferredScheduler::new(config.scheduler.clone())
        .schedule(aggregator)
        .ready()
        .wait()
        .await
}

/// Signal collection and behavior monitoring for one page lifetime.
///
/// Must be created inside a tokio runtime. Dropping it stops the devtools
/// sampler; a collection already scheduled still runs to completion.
pub struct SignalCollector {
    state: Arc<SignalState>,
    collection: ScheduledCollection,
    monitor: BehaviorMonitor,
    sampler: JoinHandle<()>,
}

impl SignalCollector {
    /// Schedule the one-shot collection and start behavior monitoring
    pub fn start(host: Arc<dyn Host>, config: CollectorConfig) -> Self {
        let state = Arc::new(SignalState::new());
        let monitor = BehaviorMonitor::new(host.now().timestamp_millis());

        let aggregator = SignalAggregator::new(Arc::clone(&host), Arc::clone(&state));
        let collection = DeferredScheduler::new(config.scheduler).schedule(aggregator);
        let sampler = spawn_devtools_sampler(host, monitor.clone(), config.devtools);

        Self {
            state,
            collection,
            monitor,
            sampler,
        }
    }

    /// Handle that resolves once the scheduled collection settles
    pub fn ready(&self) -> ReadyHandle {
        self.collection.ready()
    }

    /// The published snapshot, if collection has completed
    pub fn snapshot(&self) -> Option<Arc<ClientSignalSnapshot>> {
        self.state.current()
    }

    pub fn state(&self) -> &Arc<SignalState> {
        &self.state
    }

    /// Up-to-date copy of the behavior record
    pub fn behavior(&self) -> BehaviorRecord {
        self.monitor.snapshot()
    }

    /// Monitor handle for wiring host event listeners
    pub fn monitor(&self) -> &BehaviorMonitor {
        &self.monitor
    }

    pub fn dispatch(&self, event: &PageEvent) {
        self.monitor.dispatch(event);
    }
}

impl Drop for SignalCollector {
    fn drop(&mut self) {
        self.sampler.abort();
    }
}
