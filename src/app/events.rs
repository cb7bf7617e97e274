//! Outbound application events.
//!
//! The [`RailSupervisor`](super::service::RailSupervisor) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, publish on
//! the vehicle bus, or both.  Emission is fire-and-forget: the core never
//! waits for an acknowledgment.

use crate::channel::{FaultKind, PendingCommand, RailId, Tick};

use super::commands::Command;

/// Structured events emitted by the rail engine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A non-ignored fault is active on a rail; carries the latch tick.
    FaultReport {
        rail: RailId,
        fault: FaultKind,
        tick: Tick,
    },

    /// A latched fault timed out and auto-cleared.
    FaultCleared { rail: RailId, tick: Tick },

    /// A new setpoint was taken from the command source.
    CommandAccepted { rail: RailId, command: Command },

    /// Periodic snapshot of every rail.
    Telemetry(TelemetryData),

    /// The supervisor has started sweeping.
    Started,
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryData {
    pub tick: Tick,
    pub rails: [RailTelemetry; RailId::COUNT],
}

/// One rail's slice of the telemetry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RailTelemetry {
    pub id: RailId,
    pub fault: FaultKind,
    pub fault_since: Tick,
    pub pending: PendingCommand,
}
