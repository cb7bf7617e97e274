//! Rail switch driver (LEDC PWM → high-side gate driver).
//!
//! A dumb actuator: takes a 16-bit duty value and puts it on the rail's
//! LEDC channel.  Fault arbitration lives in the supervisor; nothing here
//! second-guesses the value it is given.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::channel::{PwmBinding, DUTY_OFF};
use crate::drivers::hw_init;

pub struct RailSwitch {
    binding: PwmBinding,
    hw_duty: u16,
}

impl RailSwitch {
    pub fn new(binding: PwmBinding) -> Self {
        Self {
            binding,
            hw_duty: DUTY_OFF,
        }
    }

    /// Write a duty value straight to the hardware channel.
    pub fn set(&mut self, duty: u16) {
        hw_init::ledc_set(hw_init::ledc_channel(self.binding), duty);
        self.hw_duty = duty;
    }

    pub fn off(&mut self) {
        self.set(DUTY_OFF);
    }

    pub fn binding(&self) -> PwmBinding {
        self.binding
    }

    /// Last duty value written to hardware.
    pub fn current_duty(&self) -> u16 {
        self.hw_duty
    }

    pub fn is_on(&self) -> bool {
        self.hw_duty > DUTY_OFF
    }
}
