//! INA-style I²C power monitor, one per rail.
//!
//! Each rail has a dedicated monitor IC strapped to its own bus address
//! (see [`crate::pins::monitor_addr`]).  The device exposes 16-bit
//! registers; board-side calibration is chosen so the bus-voltage register
//! reads directly in millivolts and the current register in milliamps, so
//! no scaling happens here.
//!
//! Generic over [`embedded_hal::i2c::I2c`], which keeps the driver fully
//! host-testable against a mock bus.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::error::SensorError;

/// Bus-voltage register (LSB = 1 mV with board calibration).
const REG_BUS_VOLTAGE: u8 = 0x02;
/// Current register (LSB = 1 mA with board calibration).
const REG_CURRENT: u8 = 0x04;

/// Shared monitor bus: one I²C peripheral, six monitor ICs.
pub struct MonitorBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> MonitorBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Rail voltage in millivolts.
    pub fn read_voltage_mv(&mut self, addr: u8) -> Result<u16, SensorError> {
        self.read_register(addr, REG_BUS_VOLTAGE)
    }

    /// Rail current in milliamps.
    pub fn read_current_ma(&mut self, addr: u8) -> Result<u16, SensorError> {
        self.read_register(addr, REG_CURRENT)
    }

    fn read_register(&mut self, addr: u8, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        if let Err(e) = self.i2c.write_read(addr, &[reg], &mut buf) {
            warn!("monitor 0x{addr:02x} reg 0x{reg:02x} read failed: {e:?}");
            return Err(SensorError::BusReadFailed);
        }
        let value = u16::from_be_bytes(buf);
        // All-ones is what a floating bus or a powered-down monitor returns;
        // treat it as a bad sample rather than a 65 V reading.
        if value == 0xffff {
            return Err(SensorError::BadRegisterValue);
        }
        Ok(value)
    }
}
