//! Client Signals - Client-side signal collector for bot and automation detection
//!
//! The collector gathers device and environment fingerprints and observes
//! in-page behavior, producing confidence signals for a server-side risk
//! decision. Two pieces carry the design:
//!
//! - **Signal collection**: a deferred, one-shot pipeline that runs every
//!   probe, tolerates any of them failing, and publishes exactly one
//!   snapshot behind a shared ready handle.
//! - **Behavior monitoring**: event-driven counters plus a debounced
//!   devtools-open heuristic sampled once per second.
//!
//! All host access goes through the [`host::Host`] trait.

pub mod aggregator;
pub mod behavior;
pub mod config;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod probes;
pub mod scheduler;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregator::{SignalAggregator, SignalState};
pub use config::CollectorConfig;
pub use error::{HostError, SignalError};
pub use host::Host;
pub use pipeline::{collect_signals, SignalCollector};
pub use scheduler::{DeferredScheduler, ReadyHandle};
pub use types::{ClientSignalSnapshot, WebGlInfo};

// Behavioral exports
pub use behavior::{BehaviorMonitor, BehaviorRecord, DevtoolsConfidence, PageEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
