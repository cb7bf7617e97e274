//! One-shot hardware peripheral initialization.
//!
//! Configures the LEDC timers and the six rail-switch PWM channels using
//! raw ESP-IDF sys calls. Called once from `main()` before the control
//! loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::channel::RailId;
use crate::channel::{PwmBinding, PwmTimer};
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed(rc) => write!(f, "LEDC channel config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── LEDC PWM ─────────────────────────────────────────────────

/// LEDC channel number for a rail binding.  Rails on timer 0 occupy
/// channels 0-3, rails on timer 1 occupy channels 4-5, in sub-channel
/// order.  Sub-channels are numbered from 1.
pub const fn ledc_channel(binding: PwmBinding) -> u32 {
    match binding.timer {
        PwmTimer::Timer0 => binding.sub_channel as u32 - 1,
        PwmTimer::Timer1 => binding.sub_channel as u32 + 3,
    }
}

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Two timers, identical configuration.  Keeping the rails on separate
    // timers mirrors the board routing, not an electrical requirement.
    // SAFETY: Called from single main-task context via init_peripherals().
    for timer_num in [ledc_timer_t_LEDC_TIMER_0, ledc_timer_t_LEDC_TIMER_1] {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_13_BIT,
            freq_hz: pins::RAIL_PWM_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        let ret = unsafe { ledc_timer_config(&timer) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcTimerFailed(ret));
        }
    }

    // One channel per rail, all parked at duty 0 until the first dispatch.
    for id in RailId::ALL {
        let binding = pins::rail_binding(id);
        let timer_sel = match binding.timer {
            PwmTimer::Timer0 => ledc_timer_t_LEDC_TIMER_0,
            PwmTimer::Timer1 => ledc_timer_t_LEDC_TIMER_1,
        };
        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: ledc_channel(binding),
                timer_sel,
                gpio_num: pins::RAIL_PWM_GPIOS[id.index()],
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcChannelFailed(ret));
        }
    }

    info!("hw_init: LEDC configured, 6 rail channels on 2 timers");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u16) {
    // Rescale the engine's 16-bit duty range into the timer's resolution.
    let duty = (duty as u32) >> (16 - pins::PWM_RESOLUTION_BITS);
    // SAFETY: LEDC channels were configured in init_ledc(); duty register
    // writes are race-free since only the control loop calls this function.
    unsafe {
        esp_idf_svc::sys::ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        esp_idf_svc::sys::ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u16) {}
