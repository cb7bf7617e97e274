//! Sensor subsystem — the shared power-monitor bus driver.
//!
//! One I²C peripheral serves all six rail monitors; the supervisor
//! addresses them per rail through [`MonitorBus`].

pub mod power_monitor;

pub use power_monitor::MonitorBus;
