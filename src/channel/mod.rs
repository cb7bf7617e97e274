//! Rail domain core — channel records, fault classification, timeout and
//! response policy.  Pure logic, zero I/O.
//!
//! A *rail* is one independently monitored and switched power-delivery
//! output.  Each rail owns a static configuration (monitor address, PWM
//! binding, thresholds) and two small pieces of mutable state: the latched
//! [`FaultKind`] with its latch timestamp, and the pending actuator
//! command.  Everything else in the engine — classification, timeout
//! clearing, severity lookup — is table-driven and stateless.

pub mod fault;
pub mod policy;
pub mod timeout;

pub use fault::{FaultKind, Thresholds};
pub use policy::{Profile, ResponseMatrix, ResponseProfile, Severity};
pub use timeout::TimeoutPolicy;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Millisecond-resolution monotonic tick, sourced externally.
/// Comparisons use wrapping arithmetic; see [`TimeoutPolicy::is_timed_out`].
pub type Tick = u32;

/// Duty value meaning "fully on".
pub const DUTY_MAX: u16 = u16::MAX;
/// Duty value meaning "fully off".
pub const DUTY_OFF: u16 = 0;

// ---------------------------------------------------------------------------
// Rail identity
// ---------------------------------------------------------------------------

/// The six power rails on the distribution board.
///
/// The discriminant doubles as the row index into the response matrix and
/// the sweep order of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RailId {
    Vcu = 0,
    Shutdown = 1,
    Pumps = 2,
    Fans = 3,
    Aero = 4,
    Regen = 5,
}

impl RailId {
    /// Number of rails — fixed by the board layout.
    pub const COUNT: usize = 6;

    /// All rails in sweep (ascending index) order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Vcu,
        Self::Shutdown,
        Self::Pumps,
        Self::Fans,
        Self::Aero,
        Self::Regen,
    ];

    /// Row index into the response matrix.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vcu => write!(f, "vcu"),
            Self::Shutdown => write!(f, "shutdown"),
            Self::Pumps => write!(f, "pumps"),
            Self::Fans => write!(f, "fans"),
            Self::Aero => write!(f, "aero"),
            Self::Regen => write!(f, "regen"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator binding
// ---------------------------------------------------------------------------

/// Which hardware PWM timer a rail switch hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PwmTimer {
    Timer0,
    Timer1,
}

/// A rail switch's PWM slot: timer plus sub-channel on that timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwmBinding {
    pub timer: PwmTimer,
    pub sub_channel: u8,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// The rail's stored actuator command, applied by the dispatcher whenever
/// the rail is written and no force-off overrides it.
///
/// `None` means "leave the switch where it is": the dispatcher issues no
/// hardware write at all for that rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    /// Full on (`DUTY_MAX`).
    On,
    /// Full off (duty 0).
    Off,
    /// A specific duty value, passed through unclamped.
    Duty(u16),
    /// No command — the actuator retains its previous output.
    None,
}

// ---------------------------------------------------------------------------
// Static configuration
// ---------------------------------------------------------------------------

/// One rail's wiring: monitor bus address, PWM binding, and the electrical
/// window its readings are classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailConfig {
    /// 7-bit I2C address of the rail's power monitor.
    pub monitor_addr: u8,
    /// PWM timer/sub-channel driving the rail switch.
    pub binding: PwmBinding,
    pub thresholds: Thresholds,
}

// ---------------------------------------------------------------------------
// Rail record
// ---------------------------------------------------------------------------

/// Per-rail mutable record, owned by the supervisor's arena for the process
/// lifetime.  Only the updater and dispatcher touch the mutable fields,
/// once per sweep, never concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Rail {
    pub id: RailId,
    pub config: RailConfig,
    /// Currently latched fault (`FaultKind::None` when healthy).
    pub fault: FaultKind,
    /// Tick of the last fault-state transition.  Refreshed every cycle the
    /// underlying condition persists, so a live fault never times out.
    pub fault_since: Tick,
    /// Last received actuator command.
    pub pending: PendingCommand,
}

impl Rail {
    /// A freshly booted rail: healthy, commanded fully on.
    pub fn new(id: RailId, config: RailConfig, now: Tick) -> Self {
        Self {
            id,
            config,
            fault: FaultKind::None,
            fault_since: now,
            pending: PendingCommand::On,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_config() -> RailConfig {
        RailConfig {
            monitor_addr: 0x41,
            binding: PwmBinding {
                timer: PwmTimer::Timer0,
                sub_channel: 1,
            },
            thresholds: Thresholds::new(33, 113, 44, 344).unwrap(),
        }
    }

    #[test]
    fn new_rail_boots_healthy_and_on() {
        let rail = Rail::new(RailId::Shutdown, any_config(), 1001);
        assert_eq!(rail.fault, FaultKind::None);
        assert_eq!(rail.fault_since, 1001);
        assert_eq!(rail.pending, PendingCommand::On);
        assert_eq!(rail.config.monitor_addr, 0x41);
    }

    #[test]
    fn rail_index_matches_sweep_order() {
        for (i, rail) in RailId::ALL.iter().enumerate() {
            assert_eq!(rail.index(), i);
        }
    }
}
