//! Command mailbox adapter.
//!
//! Implements [`CommandSource`] as a per-rail mailbox: one slot per rail,
//! last write wins.  `poll()` takes the slot, so a command is delivered to
//! the supervisor exactly once.  Commands arriving faster than the sweep
//! can consume them simply replace each other, which is the right
//! semantics for setpoints — only the newest one matters.
//!
//! Production submissions come from the debug console today; a CAN
//! receive task would push into the same mailbox.

use log::debug;

use crate::app::commands::Command;
use crate::app::ports::CommandSource;
use crate::channel::RailId;

/// One pending command slot per rail.
#[derive(Default)]
pub struct CommandMailbox {
    slots: [Option<Command>; RailId::COUNT],
}

impl CommandMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for a rail, replacing any unconsumed one.
    pub fn submit(&mut self, rail: RailId, command: Command) {
        if let Some(old) = self.slots[rail.index()].replace(command) {
            debug!("{rail}: replacing unconsumed command {old:?} with {command:?}");
        }
    }

    /// True if any rail has an undelivered command.
    pub fn is_pending(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }
}

impl CommandSource for CommandMailbox {
    fn poll(&mut self, rail: RailId) -> Option<Command> {
        self.slots[rail.index()].take()
    }
}
