//! Fault journal and panic diagnostics.
//!
//! Keeps the most recent fault activity in a fixed-capacity in-RAM ring
//! so the debug console can answer "what tripped since power-on" without
//! scrolling back through the serial log.  The journal is fed by wrapping
//! the production event sink in [`JournalSink`].
//!
//! A panic hook logs the panic reason through the ESP-IDF logger before
//! the default handler resets the chip.

use heapless::HistoryBuffer;
use log::error;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::channel::{FaultKind, RailId, Tick};

/// Journal capacity; oldest entries are overwritten.
const JOURNAL_SLOTS: usize = 32;

/// One fault-lifecycle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultRecord {
    pub rail: RailId,
    /// `FaultKind::None` marks a clear, anything else a report.
    pub fault: FaultKind,
    pub tick: Tick,
}

/// Fixed-capacity ring of recent fault reports and clears.
#[derive(Default)]
pub struct FaultJournal {
    entries: HistoryBuffer<FaultRecord, JOURNAL_SLOTS>,
    total_reports: u32,
}

impl FaultJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: FaultRecord) {
        if record.fault.is_fault() {
            self.total_reports = self.total_reports.saturating_add(1);
        }
        self.entries.write(record);
    }

    /// Entries in oldest-first order.
    pub fn recent(&self) -> impl Iterator<Item = &FaultRecord> {
        self.entries.oldest_ordered()
    }

    /// Reports seen since power-on, including ones the ring has evicted.
    pub fn total_reports(&self) -> u32 {
        self.total_reports
    }
}

/// Event sink wrapper: forwards everything to the inner sink and records
/// fault lifecycle events into the journal on the way through.
pub struct JournalSink<S> {
    inner: S,
    pub journal: FaultJournal,
}

impl<S: EventSink> JournalSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            journal: FaultJournal::new(),
        }
    }
}

impl<S: EventSink> EventSink for JournalSink<S> {
    fn emit(&mut self, event: &AppEvent) {
        match *event {
            AppEvent::FaultReport { rail, fault, tick } => {
                self.journal.record(FaultRecord { rail, fault, tick });
            }
            AppEvent::FaultCleared { rail, tick } => {
                self.journal.record(FaultRecord {
                    rail,
                    fault: FaultKind::None,
                    tick,
                });
            }
            _ => {}
        }
        self.inner.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that puts the reason on the serial log before the
/// default handler aborts (which triggers a chip reset under ESP-IDF).
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        error!("PANIC: {}", reason);
    }));
}
