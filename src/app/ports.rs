//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RailSupervisor (domain)
//! ```
//!
//! Driven adapters (the sensor bus, the PWM switches, the vehicle bus, NVS)
//! implement these traits.  The [`RailSupervisor`](super::service::RailSupervisor)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole engine runs against mocks on the host.

use crate::channel::{PwmBinding, RailId, Tick};
use crate::config::SystemConfig;
use crate::error::SensorError;

use super::commands::Command;
use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port over the power-monitor bus.
///
/// Implementations must fail fast: a transport problem is reported as
/// `Err(SensorError)` for that call, never by blocking.  The updater treats
/// an error as "data unavailable this cycle" — it is never mapped to an
/// electrical fault.
pub trait SensorPort {
    /// Bus voltage at the monitor with the given 7-bit address, in mV.
    fn read_voltage_mv(&mut self, addr: u8) -> Result<u16, SensorError>;

    /// Load current at the monitor with the given 7-bit address, in mA.
    fn read_current_ma(&mut self, addr: u8) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the dispatcher calls this to drive a rail switch.
/// `duty` runs 0 (fully off) to [`DUTY_MAX`](crate::channel::DUTY_MAX)
/// (fully on); values are passed through unclamped.
pub trait ActuatorPort {
    fn write_duty(&mut self, binding: PwmBinding, duty: u16);
}

// ───────────────────────────────────────────────────────────────
// Command source (driven adapter: vehicle bus → domain)
// ───────────────────────────────────────────────────────────────

/// Non-blocking source of actuator setpoints from the vehicle bus.
///
/// `None` is the normal quiet-bus outcome, not an error.  The wire protocol
/// behind this trait is the bus adapter's business; the core only sees the
/// decoded [`Command`].
pub trait CommandSource {
    fn poll(&mut self, rail: RailId) -> Option<Command>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port,
/// fire-and-forget.  Adapters decide where they go (serial log, vehicle
/// bus telemetry, both).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Tick source
// ───────────────────────────────────────────────────────────────

/// Monotonically increasing millisecond counter, read-only from the core's
/// perspective.  Wraps at `Tick::MAX`; the timeout policy compares with
/// wrapping arithmetic.
pub trait TickSource {
    fn now_ticks(&self) -> Tick;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting — an invalid range is
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
