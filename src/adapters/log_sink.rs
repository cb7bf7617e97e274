//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future CAN or BLE adapter would implement the same trait.
//!
//! Fault reports are rate-limited with a token bucket: a rail that faults
//! on every 10 ms sweep would otherwise put a hundred identical lines per
//! second on the wire.  Clears, commands, and telemetry always go through.

use core::time::Duration;

use burster::Limiter;
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Sustained fault-report rate (lines per second) and burst capacity.
const FAULT_REPORT_RATE: u64 = 5;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    fault_limiter: burster::TokenBucket<fn() -> Duration>,
    suppressed: u32,
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self {
            fault_limiter: burster::TokenBucket::new_with_time_provider(
                FAULT_REPORT_RATE,
                FAULT_REPORT_RATE,
                platform_now as fn() -> Duration,
            ),
            suppressed: 0,
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::FaultReport { rail, fault, tick } => {
                if self.fault_limiter.try_consume(1).is_ok() {
                    if self.suppressed > 0 {
                        info!("FAULT | ({} reports suppressed)", self.suppressed);
                        self.suppressed = 0;
                    }
                    warn!("FAULT | {} | {} | since t={}", rail, fault, tick);
                } else {
                    self.suppressed = self.suppressed.saturating_add(1);
                }
            }
            AppEvent::FaultCleared { rail, tick } => {
                info!("CLEAR | {} | t={}", rail, tick);
            }
            AppEvent::CommandAccepted { rail, command } => {
                info!("CMD   | {} | {:?}", rail, command);
            }
            AppEvent::Telemetry(t) => {
                for r in &t.rails {
                    info!(
                        "TELEM | t={} | {} | fault={} since={} | pending={:?}",
                        t.tick, r.id, r.fault, r.fault_since, r.pending,
                    );
                }
            }
            AppEvent::Started => {
                info!("START | rail supervisor sweeping");
            }
        }
    }
}

// ── Platform time for rate limiter ───────────────────────────

#[cfg(target_os = "espidf")]
fn platform_now() -> Duration {
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    Duration::from_micros(us as u64)
}

#[cfg(not(target_os = "espidf"))]
fn platform_now() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::channel::{FaultKind, RailId};

    #[test]
    fn burst_of_fault_reports_is_capped() {
        let mut sink = LogEventSink::new();
        let event = AppEvent::FaultReport {
            rail: RailId::Fans,
            fault: FaultKind::OverCurrent,
            tick: 7,
        };
        // Exhaust the burst allowance in a tight loop; the remainder must
        // be counted as suppressed rather than logged.
        for _ in 0..100 {
            sink.emit(&event);
        }
        assert!(sink.suppressed >= 100 - FAULT_REPORT_RATE as u32 - 1);
    }

    #[test]
    fn non_fault_events_are_never_limited() {
        let mut sink = LogEventSink::new();
        for _ in 0..100 {
            sink.emit(&AppEvent::FaultCleared {
                rail: RailId::Vcu,
                tick: 1,
            });
        }
        assert_eq!(sink.suppressed, 0);
    }
}
