//! GPIO / peripheral assignments for the PDM main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers or bus addresses.  Change an assignment here and
//! it propagates everywhere.

use crate::channel::{PwmBinding, PwmTimer, RailId};

// ---------------------------------------------------------------------------
// I²C bus — power monitors
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// Power monitors are polled every control cycle; standard mode is plenty.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// 7-bit I²C address of each rail's power monitor.  Addresses are strapped
/// sequentially on the board, one monitor per rail.
pub const fn monitor_addr(rail: RailId) -> u8 {
    0x40 + rail.index() as u8
}

// ---------------------------------------------------------------------------
// Rail switches (LEDC PWM → gate drivers)
// ---------------------------------------------------------------------------

/// GPIO driving each rail's gate driver, indexed by [`RailId`].
pub const RAIL_PWM_GPIOS: [i32; RailId::COUNT] = [1, 2, 4, 5, 6, 7];

/// LEDC timer and sub-channel for a rail.  The first four rails share
/// timer 0, the last two share timer 1, matching the board layout.
pub const fn rail_binding(rail: RailId) -> PwmBinding {
    let idx = rail.index() as u8;
    if idx < 4 {
        PwmBinding {
            timer: PwmTimer::Timer0,
            sub_channel: idx + 1,
        }
    } else {
        PwmBinding {
            timer: PwmTimer::Timer1,
            sub_channel: idx - 3,
        }
    }
}

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  The duty range used by the engine is
/// 16-bit; the driver rescales into whatever the timer supports.
pub const PWM_RESOLUTION_BITS: u32 = 13;
/// LEDC base frequency for the rail switches (20 kHz — inaudible).
pub const RAIL_PWM_FREQ_HZ: u32 = 20_000;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_split_across_two_timers() {
        for id in RailId::ALL {
            let b = rail_binding(id);
            let expected = if id.index() < 4 {
                PwmTimer::Timer0
            } else {
                PwmTimer::Timer1
            };
            assert_eq!(b.timer, expected, "{id}");
        }
    }

    #[test]
    fn monitor_addrs_are_unique() {
        for a in RailId::ALL {
            for b in RailId::ALL {
                if a != b {
                    assert_ne!(monitor_addr(a), monitor_addr(b));
                }
            }
        }
    }
}
