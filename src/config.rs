//! System configuration parameters
//!
//! All tunable parameters for the LVPDM board.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::channel::{Profile, RailId, Thresholds};
use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Which response matrix / timeout tables to boot with.
    pub profile: Profile,

    // --- Timing ---
    /// Control loop (sweep) interval in milliseconds.
    pub control_loop_interval_ms: u32,
    /// Telemetry snapshot interval (seconds).
    pub telemetry_interval_secs: u32,

    // --- Electrical windows ---
    /// Per-rail threshold windows, indexed by [`RailId`].
    pub rail_limits: [Thresholds; RailId::COUNT],
}

impl Default for SystemConfig {
    fn default() -> Self {
        // Nominal 12 V accumulator LV rails: generous voltage window,
        // per-rail current ceilings sized to the loads on the harness.
        let window = |cmax| Thresholds {
            volt_min_mv: 9_000,
            volt_max_mv: 15_000,
            curr_min_ma: 0,
            curr_max_ma: cmax,
        };
        Self {
            profile: default_profile(),
            control_loop_interval_ms: 10, // 100 Hz sweep
            telemetry_interval_secs: 1,
            rail_limits: [
                window(3_000),  // Vcu
                window(2_000),  // Shutdown
                window(15_000), // Pumps
                window(20_000), // Fans
                window(10_000), // Aero
                window(5_000),  // Regen
            ],
        }
    }
}

/// Build-time profile selection, mirroring the board's bring-up switch.
fn default_profile() -> Profile {
    if cfg!(feature = "development-profile") {
        Profile::Development
    } else {
        Profile::Competition
    }
}

impl SystemConfig {
    /// Range-check every field.  Called before persisting and after
    /// loading, so a corrupted or hostile NVS blob can never smuggle an
    /// inverted threshold window past the classifier.
    pub fn validate(&self) -> Result<(), Error> {
        if self.control_loop_interval_ms == 0 {
            return Err(Error::Config("control_loop_interval_ms must be > 0"));
        }
        if self.telemetry_interval_secs == 0 {
            return Err(Error::Config("telemetry_interval_secs must be > 0"));
        }
        for limits in &self.rail_limits {
            // Re-run the constructor invariant on deserialized windows.
            Thresholds::new(
                limits.volt_min_mv,
                limits.volt_max_mv,
                limits.curr_min_ma,
                limits.curr_max_ma,
            )?;
        }
        Ok(())
    }

    /// The threshold window for one rail.
    pub fn limits(&self, rail: RailId) -> Thresholds {
        self.rail_limits[rail.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.control_loop_interval_ms > 0);
        assert!(c.telemetry_interval_secs > 0);
        assert!(c.validate().is_ok());
        for rail in RailId::ALL {
            let w = c.limits(rail);
            assert!(w.volt_min_mv <= w.volt_max_mv);
            assert!(w.curr_min_ma <= w.curr_max_ma);
        }
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.profile, c2.profile);
        assert_eq!(c.control_loop_interval_ms, c2.control_loop_interval_ms);
        assert_eq!(c.rail_limits, c2.rail_limits);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.rail_limits, c2.rail_limits);
        assert_eq!(c.profile, c2.profile);
    }

    #[test]
    fn inverted_window_fails_validation() {
        let mut c = SystemConfig::default();
        c.rail_limits[RailId::Fans.index()].volt_min_mv = 20_000;
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut c = SystemConfig::default();
        c.control_loop_interval_ms = 0;
        assert!(c.validate().is_err());
    }
}
