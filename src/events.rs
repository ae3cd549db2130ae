//! Structured event sink for probe outcomes
//!
//! Components report findings through an injected [`EventSink`] instead of
//! logging directly, so embedders can route events anywhere: the default
//! [`TracingSink`] forwards to `tracing`, the CLI installs its own console
//! sink, and [`MemorySink`] collects events for inspection.

use parking_lot::Mutex;

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Pipeline phase an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AccountProbe,
    ContainerProbe,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::AccountProbe => write!(f, "account-probe"),
            Phase::ContainerProbe => write!(f, "container-probe"),
        }
    }
}

/// What happened to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Discarded,
    Retried,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Confirmed => write!(f, "confirmed"),
            Outcome::Discarded => write!(f, "discarded"),
            Outcome::Retried => write!(f, "retried"),
        }
    }
}

/// One structured probe event.
#[derive(Debug, Clone)]
pub struct ProbeEvent {
    pub level: Level,
    pub phase: Phase,
    pub candidate: String,
    pub endpoint: String,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

/// Sink for probe events. Implementations must be cheap and non-blocking;
/// probers call `emit` from concurrent tasks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProbeEvent);
}

/// Default sink: forwards events to `tracing` with structured fields.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: ProbeEvent) {
        let detail = event.detail.as_deref().unwrap_or("");
        match event.level {
            Level::Debug => tracing::debug!(
                phase = %event.phase,
                candidate = %event.candidate,
                endpoint = %event.endpoint,
                outcome = %event.outcome,
                detail = %detail,
                "probe event"
            ),
            Level::Info => tracing::info!(
                phase = %event.phase,
                candidate = %event.candidate,
                endpoint = %event.endpoint,
                outcome = %event.outcome,
                detail = %detail,
                "probe event"
            ),
            Level::Warn => tracing::warn!(
                phase = %event.phase,
                candidate = %event.candidate,
                endpoint = %event.endpoint,
                outcome = %event.outcome,
                detail = %detail,
                "probe event"
            ),
            Level::Error => tracing::error!(
                phase = %event.phase,
                candidate = %event.candidate,
                endpoint = %event.endpoint,
                outcome = %event.outcome,
                detail = %detail,
                "probe event"
            ),
        }
    }
}

/// Sink that collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProbeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ProbeEvent) {
        self.events.lock().push(event);
    }
}
