//! LVPDM Firmware — Main Entry Point
//!
//! Hexagonal architecture around a fixed-rate rail sweep.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HardwareAdapter    LogEventSink    NvsAdapter           │
//! │  (Sensor+Actuator)  (EventSink)     (ConfigPort)         │
//! │  CommandMailbox     Esp32Time                            │
//! │  (CommandSource)    (TickSource)                         │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │          RailSupervisor (pure logic)           │      │
//! │  │  classify · latch/timeout · arbitrate          │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod channel;
pub mod config;
mod diagnostics;
mod error;
mod pins;

pub mod app;
mod adapters;
mod drivers;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::command_queue::CommandMailbox;
use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsAdapter;
use adapters::time::Esp32TimeAdapter;
use app::events::AppEvent;
use app::ports::{ConfigPort, EventSink, TickSource};
use app::service::RailSupervisor;
use config::SystemConfig;
use diagnostics::JournalSink;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LVPDM v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // LEDC init failure is critical — with no PWM there is no way to
        // switch a rail off.  Halt and let the watchdog reset.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = match nvs.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => {
            info!("Config loaded, profile={:?}", cfg.profile);
            cfg
        }
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
        None => SystemConfig::default(),
    };

    // ── 4. Construct adapters ─────────────────────────────────
    let time_adapter = Esp32TimeAdapter::new();

    let i2c = init_i2c()?;
    let mut hw = HardwareAdapter::new(i2c);

    let mut sink = JournalSink::new(LogEventSink::new());

    // Commands arrive from the debug console today; a CAN receive task
    // will push into the same mailbox.
    let mut commands = CommandMailbox::new();

    // ── 5. Construct the supervisor ───────────────────────────
    let mut supervisor = RailSupervisor::new(&config, time_adapter.now_ticks());
    supervisor.start(&mut sink);

    info!(
        "System ready. Sweeping {} rails every {} ms.",
        channel::RailId::COUNT,
        config.control_loop_interval_ms,
    );

    // ── 6. Control loop ───────────────────────────────────────
    let sweeps_per_telemetry =
        (config.telemetry_interval_secs as u64 * 1_000 / config.control_loop_interval_ms as u64).max(1);

    loop {
        sleep_ms(config.control_loop_interval_ms);

        let now = time_adapter.now_ticks();
        supervisor.sweep(&mut hw, &mut commands, &mut sink, now);

        if supervisor.sweep_count() % sweeps_per_telemetry == 0 {
            sink.emit(&AppEvent::Telemetry(supervisor.build_telemetry(now)));
        }

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}

// ── Platform plumbing ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_i2c() -> Result<esp_idf_hal::i2c::I2cDriver<'static>> {
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;

    let peripherals = Peripherals::take()?;
    // SAFETY: the pin numbers come from the board map and are claimed
    // exactly once, here, before the control loop starts.
    let sda = unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) };
    let scl = unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) };
    let cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &cfg)?;
    Ok(i2c)
}

#[cfg(target_os = "espidf")]
fn sleep_ms(ms: u32) {
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
fn init_i2c() -> Result<sim::NullI2c> {
    Ok(sim::NullI2c)
}

#[cfg(not(target_os = "espidf"))]
fn sleep_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(ms as u64));
}

/// Host-side stand-in so the binary can run as a simulation: every
/// monitor read fails, which the supervisor treats as "no fresh data".
#[cfg(not(target_os = "espidf"))]
mod sim {
    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

    pub struct NullI2c;

    #[derive(Debug)]
    pub struct NoBus;

    impl embedded_hal::i2c::Error for NoBus {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for NullI2c {
        type Error = NoBus;
    }

    impl I2c for NullI2c {
        fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            Err(NoBus)
        }
    }
}
