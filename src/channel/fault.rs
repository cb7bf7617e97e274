//! Fault classification — readings in, a single [`FaultKind`] out.
//!
//! The classifier is a pure function of one rail's thresholds and one pair
//! of live readings.  When several thresholds are violated at once the
//! evaluation order below is the tie-break: voltage before current, under
//! before over.  That order is a fixed design choice, not a severity
//! ranking — severity comes from the response matrix.

use core::fmt;

use crate::error::Error;

/// Classification of one rail's electrical condition.
///
/// `None` is the explicit no-fault sentinel: a rail always carries exactly
/// one `FaultKind`, so the latch/clear logic needs no `Option` wrapping and
/// the response matrix stays total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaultKind {
    OverVoltage = 0,
    UnderVoltage = 1,
    OverCurrent = 2,
    UnderCurrent = 3,
    None = 4,
}

impl FaultKind {
    /// Number of kinds — sizes the per-fault lookup tables.
    pub const COUNT: usize = 5;

    /// All kinds, in table-row order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::OverVoltage,
        Self::UnderVoltage,
        Self::OverCurrent,
        Self::UnderCurrent,
        Self::None,
    ];

    /// Row index into the timeout table and response matrix columns.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for every kind except the `None` sentinel.
    pub const fn is_fault(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverVoltage => write!(f, "over-voltage"),
            Self::UnderVoltage => write!(f, "under-voltage"),
            Self::OverCurrent => write!(f, "over-current"),
            Self::UnderCurrent => write!(f, "under-current"),
            Self::None => write!(f, "no fault"),
        }
    }
}

/// One rail's electrical operating window.  Units: millivolts / milliamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Thresholds {
    pub volt_min_mv: u16,
    pub volt_max_mv: u16,
    pub curr_min_ma: u16,
    pub curr_max_ma: u16,
}

impl Thresholds {
    /// Build a threshold window, rejecting inverted pairs.
    ///
    /// `min <= max` is a constructor invariant so the classifier never has
    /// to reason about an empty window at runtime.
    pub fn new(
        volt_min_mv: u16,
        volt_max_mv: u16,
        curr_min_ma: u16,
        curr_max_ma: u16,
    ) -> Result<Self, Error> {
        if volt_min_mv > volt_max_mv {
            return Err(Error::Config("voltage thresholds inverted (min > max)"));
        }
        if curr_min_ma > curr_max_ma {
            return Err(Error::Config("current thresholds inverted (min > max)"));
        }
        Ok(Self {
            volt_min_mv,
            volt_max_mv,
            curr_min_ma,
            curr_max_ma,
        })
    }

    /// Classify a pair of live readings against this window.
    ///
    /// Returns the first match in the fixed priority order; exactly one
    /// kind per call, `FaultKind::None` iff all four checks pass.
    pub fn classify(&self, voltage_mv: u16, current_ma: u16) -> FaultKind {
        if voltage_mv < self.volt_min_mv {
            return FaultKind::UnderVoltage;
        }
        if voltage_mv > self.volt_max_mv {
            return FaultKind::OverVoltage;
        }
        if current_ma < self.curr_min_ma {
            return FaultKind::UnderCurrent;
        }
        if current_ma > self.curr_max_ma {
            return FaultKind::OverCurrent;
        }
        FaultKind::None
    }
}
