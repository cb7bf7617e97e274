//! Inbound actuator commands.
//!
//! These are the decoded setpoints the vehicle bus (or a debug console)
//! hands to the core through the
//! [`CommandSource`](super::ports::CommandSource) port.  The core stores
//! the most recent one per rail and replays it on every dispatch.

use crate::channel::PendingCommand;

/// A new setpoint for one rail.
///
/// Note there is no "no command" variant here — absence of a command is
/// expressed by [`CommandSource::poll`](super::ports::CommandSource::poll)
/// returning `None`, while a rail's *stored* command state uses
/// [`PendingCommand`], which does carry a `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the rail fully on.
    On,
    /// Switch the rail fully off.
    Off,
    /// Drive the rail switch at a specific duty value (unclamped).
    SetDuty(u16),
}

impl From<Command> for PendingCommand {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::On => Self::On,
            Command::Off => Self::Off,
            Command::SetDuty(v) => Self::Duty(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_map_onto_pending_state() {
        assert_eq!(PendingCommand::from(Command::On), PendingCommand::On);
        assert_eq!(PendingCommand::from(Command::Off), PendingCommand::Off);
        assert_eq!(
            PendingCommand::from(Command::SetDuty(500)),
            PendingCommand::Duty(500)
        );
    }
}
