//! Property and fuzz-style tests for robustness of the core tables.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use lvpdm::channel::{FaultKind, Thresholds, Tick, TimeoutPolicy};
use proptest::prelude::*;

// ── Classifier invariants ─────────────────────────────────────

/// Any (min, max) pair in order.
fn arb_window() -> impl Strategy<Value = (u16, u16)> {
    (any::<u16>(), any::<u16>()).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

proptest! {
    /// The classifier returns `None` exactly when both readings sit inside
    /// their windows; any violation yields a fault.
    #[test]
    fn no_fault_iff_both_readings_in_window(
        (vmin, vmax) in arb_window(),
        (cmin, cmax) in arb_window(),
        voltage in any::<u16>(),
        current in any::<u16>(),
    ) {
        let t = Thresholds::new(vmin, vmax, cmin, cmax).unwrap();
        let kind = t.classify(voltage, current);

        let v_ok = (vmin..=vmax).contains(&voltage);
        let c_ok = (cmin..=cmax).contains(&current);
        prop_assert_eq!(kind == FaultKind::None, v_ok && c_ok);
    }

    /// Voltage faults always outrank current faults, and each reading maps
    /// to the side of the window it actually violated.
    #[test]
    fn classification_matches_the_violated_bound(
        (vmin, vmax) in arb_window(),
        (cmin, cmax) in arb_window(),
        voltage in any::<u16>(),
        current in any::<u16>(),
    ) {
        let t = Thresholds::new(vmin, vmax, cmin, cmax).unwrap();
        let expected = if voltage < vmin {
            FaultKind::UnderVoltage
        } else if voltage > vmax {
            FaultKind::OverVoltage
        } else if current < cmin {
            FaultKind::UnderCurrent
        } else if current > cmax {
            FaultKind::OverCurrent
        } else {
            FaultKind::None
        };
        prop_assert_eq!(t.classify(voltage, current), expected);
    }

    /// An inverted window is always rejected by the constructor.
    #[test]
    fn inverted_windows_never_construct(
        (lo, hi) in arb_window(),
        (cmin, cmax) in arb_window(),
    ) {
        prop_assume!(lo != hi);
        prop_assert!(Thresholds::new(hi, lo, cmin, cmax).is_err());
    }
}

// ── Timeout boundary ──────────────────────────────────────────

proptest! {
    /// The clear condition is strict: false for every tick up to and
    /// including `since + period`, true one past it — regardless of where
    /// in the tick space the latch happened, including across wraparound.
    #[test]
    fn timeout_boundary_is_strict(
        since in any::<Tick>(),
        period in 0u32..=1_000_000,
    ) {
        let mut periods = [None; FaultKind::COUNT];
        periods[FaultKind::OverVoltage.index()] = Some(period);
        let policy = TimeoutPolicy::new(periods);

        let at_boundary = since.wrapping_add(period);
        prop_assert!(!policy.is_timed_out(FaultKind::OverVoltage, since, at_boundary));
        prop_assert!(policy.is_timed_out(
            FaultKind::OverVoltage,
            since,
            at_boundary.wrapping_add(1),
        ));
    }

    /// A kind with no period never times out, at any pair of ticks.
    #[test]
    fn missing_period_never_times_out(
        since in any::<Tick>(),
        now in any::<Tick>(),
    ) {
        let policy = TimeoutPolicy::never();
        for kind in FaultKind::ALL {
            prop_assert!(!policy.is_timed_out(kind, since, now));
        }
    }
}
