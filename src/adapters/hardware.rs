//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the shared [`MonitorBus`] and the six [`RailSwitch`] drivers,
//! exposing them through [`SensorPort`] and [`ActuatorPort`].  This is the
//! only module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::i2c::I2c;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::channel::{PwmBinding, RailId};
use crate::drivers::hw_init;
use crate::drivers::power_switch::RailSwitch;
use crate::error::SensorError;
use crate::pins;
use crate::sensors::MonitorBus;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C> {
    monitors: MonitorBus<I2C>,
    /// Indexed by LEDC channel number, which the supervisor never sees —
    /// it addresses switches by [`PwmBinding`].
    switches: [RailSwitch; RailId::COUNT],
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    pub fn new(i2c: I2C) -> Self {
        let switches = RailId::ALL.map(|id| RailSwitch::new(pins::rail_binding(id)));
        Self {
            monitors: MonitorBus::new(i2c),
            switches,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c> SensorPort for HardwareAdapter<I2C> {
    fn read_voltage_mv(&mut self, addr: u8) -> Result<u16, SensorError> {
        self.monitors.read_voltage_mv(addr)
    }

    fn read_current_ma(&mut self, addr: u8) -> Result<u16, SensorError> {
        self.monitors.read_current_ma(addr)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c> ActuatorPort for HardwareAdapter<I2C> {
    fn write_duty(&mut self, binding: PwmBinding, duty: u16) {
        self.switches[hw_init::ledc_channel(binding) as usize].set(duty);
    }
}
