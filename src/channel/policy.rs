//! Response policy — the (rail, fault) → severity matrix and its profiles.
//!
//! The matrix is a total function by construction: a fixed-size 2D array
//! indexed by [`RailId`] and [`FaultKind`], filled exhaustively when the
//! profile is built.  No lookup can miss and nothing is consulted at
//! dispatch time that was not validated at startup.

use serde::{Deserialize, Serialize};

use super::fault::FaultKind;
use super::timeout::TimeoutPolicy;
use super::RailId;

/// Policy-assigned response level for a (rail, fault) pair.
///
/// The derived `Ord` follows declaration order — `Ignore < Warn <
/// ForceOff` — and is what the "report anything above Ignore" rule in the
/// dispatcher leans on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ignore,
    Warn,
    ForceOff,
}

/// Total mapping from (rail, fault kind) to [`Severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMatrix {
    /// Rows by rail, columns by fault kind (`FaultKind::ALL` order).
    rows: [[Severity; FaultKind::COUNT]; RailId::COUNT],
}

impl ResponseMatrix {
    pub const fn new(rows: [[Severity; FaultKind::COUNT]; RailId::COUNT]) -> Self {
        Self { rows }
    }

    /// Every entry set to the same severity.
    pub const fn uniform(severity: Severity) -> Self {
        Self::new([[severity; FaultKind::COUNT]; RailId::COUNT])
    }

    /// Severity for one rail and fault kind.
    pub fn response(&self, rail: RailId, kind: FaultKind) -> Severity {
        self.rows[rail.index()][kind.index()]
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Which set of response tables the firmware boots with.
///
/// The choice is configuration, not runtime logic: the updater and
/// dispatcher only ever see the resulting [`ResponseProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Profile {
    /// Bench bring-up: every fault ignored, nothing ever forced off.
    Development,
    /// Race configuration: every real fault warns, none time out.
    Competition,
    /// Exercise tables with mixed responses and short per-fault timeouts,
    /// used on the commissioning bench to shake out the harness.
    Commissioning,
}

/// A response matrix and a fault timeout table, selected together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseProfile {
    matrix: ResponseMatrix,
    timeouts: TimeoutPolicy,
}

impl ResponseProfile {
    pub const fn new(matrix: ResponseMatrix, timeouts: TimeoutPolicy) -> Self {
        Self { matrix, timeouts }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Development => Self::development(),
            Profile::Competition => Self::competition(),
            Profile::Commissioning => Self::commissioning(),
        }
    }

    /// Severity for one rail and fault kind.
    pub fn response(&self, rail: RailId, kind: FaultKind) -> Severity {
        self.matrix.response(rail, kind)
    }

    /// The fault timeout table.
    pub fn timeouts(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    // ── Profile tables ────────────────────────────────────────

    /// Everything ignored, nothing times out.
    pub const fn development() -> Self {
        Self::new(ResponseMatrix::uniform(Severity::Ignore), TimeoutPolicy::never())
    }

    /// Every real fault warns on every rail; the no-fault column is inert.
    pub const fn competition() -> Self {
        use Severity::{Ignore, Warn};
        const ROW: [Severity; FaultKind::COUNT] = [Warn, Warn, Warn, Warn, Ignore];
        Self::new(
            ResponseMatrix::new([ROW; RailId::COUNT]),
            TimeoutPolicy::never(),
        )
    }

    /// Mixed matrix exercising every severity on every rail, with short
    /// timeouts so auto-clear paths run on the bench.
    pub const fn commissioning() -> Self {
        use Severity::{ForceOff, Ignore, Warn};
        // Columns: OverVoltage, UnderVoltage, OverCurrent, UnderCurrent, None.
        Self::new(
            ResponseMatrix::new([
                [Warn, ForceOff, Ignore, ForceOff, Ignore], // Vcu
                [Ignore, ForceOff, Warn, Warn, Ignore],     // Shutdown
                [ForceOff, Ignore, Warn, Ignore, Ignore],   // Pumps
                [Ignore, Warn, ForceOff, Warn, Ignore],     // Fans
                [Warn, ForceOff, Ignore, ForceOff, Ignore], // Aero
                [ForceOff, Ignore, Warn, Ignore, Ignore],   // Regen
            ]),
            TimeoutPolicy::new([
                Some(13), // over-voltage
                Some(32), // under-voltage
                Some(0),  // over-current
                None,     // under-current
                None,     // no fault
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order_is_ignore_warn_forceoff() {
        assert!(Severity::Ignore < Severity::Warn);
        assert!(Severity::Warn < Severity::ForceOff);
    }

    #[test]
    fn development_never_reports_or_forces_off() {
        let p = ResponseProfile::development();
        for rail in RailId::ALL {
            for kind in FaultKind::ALL {
                assert_eq!(p.response(rail, kind), Severity::Ignore);
            }
        }
    }

    #[test]
    fn competition_warns_on_every_real_fault() {
        let p = ResponseProfile::competition();
        for rail in RailId::ALL {
            for kind in FaultKind::ALL {
                let expected = if kind.is_fault() {
                    Severity::Warn
                } else {
                    Severity::Ignore
                };
                assert_eq!(p.response(rail, kind), expected);
            }
        }
        assert_eq!(*p.timeouts(), TimeoutPolicy::never());
    }

    #[test]
    fn commissioning_matrix_spot_checks() {
        let p = ResponseProfile::commissioning();
        assert_eq!(p.response(RailId::Vcu, FaultKind::OverVoltage), Severity::Warn);
        assert_eq!(
            p.response(RailId::Pumps, FaultKind::OverVoltage),
            Severity::ForceOff
        );
        assert_eq!(
            p.response(RailId::Shutdown, FaultKind::UnderVoltage),
            Severity::ForceOff
        );
        assert_eq!(
            p.response(RailId::Fans, FaultKind::OverCurrent),
            Severity::ForceOff
        );
        assert_eq!(
            p.response(RailId::Regen, FaultKind::UnderCurrent),
            Severity::Ignore
        );
    }

    #[test]
    fn commissioning_timeouts_match_bench_tables() {
        let t = *ResponseProfile::commissioning().timeouts();
        assert_eq!(t.period(FaultKind::OverVoltage), Some(13));
        assert_eq!(t.period(FaultKind::UnderVoltage), Some(32));
        assert_eq!(t.period(FaultKind::OverCurrent), Some(0));
        assert_eq!(t.period(FaultKind::UnderCurrent), None);
        assert_eq!(t.period(FaultKind::None), None);
    }

    #[test]
    fn no_fault_column_is_ignore_in_every_profile() {
        for profile in [Profile::Development, Profile::Competition, Profile::Commissioning] {
            let p = ResponseProfile::for_profile(profile);
            for rail in RailId::ALL {
                assert_eq!(p.response(rail, FaultKind::None), Severity::Ignore);
            }
        }
    }
}
