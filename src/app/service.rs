//! Rail supervisor — the hexagonal core.
//!
//! [`RailSupervisor`] owns the rail arena and the active response profile
//! and implements the whole per-sweep engine: re-classify each rail,
//! latch or time out its fault, ingest setpoints, and arbitrate the final
//! hardware write.  All I/O flows through port traits injected at call
//! sites, making the entire engine testable with mock adapters.
//!
//! ```text
//!  SensorPort ────▶ ┌──────────────────────────┐ ──▶ EventSink
//!  CommandSource ─▶ │      RailSupervisor      │
//!  ActuatorPort ◀── │  classify · latch · arb  │
//!                   └──────────────────────────┘
//! ```

use log::{debug, info};

use crate::channel::{
    FaultKind, PendingCommand, Rail, RailConfig, RailId, ResponseProfile, Severity, Tick, DUTY_MAX,
    DUTY_OFF,
};
use crate::config::SystemConfig;
use crate::pins;

use super::events::{AppEvent, RailTelemetry, TelemetryData};
use super::ports::{ActuatorPort, CommandSource, EventSink, SensorPort};

/// What one updater pass did to a rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Fault state or pending command changed; the rail must be dispatched.
    Changed,
    /// Nothing to do this cycle.
    Unchanged,
}

// ───────────────────────────────────────────────────────────────
// RailSupervisor
// ───────────────────────────────────────────────────────────────

/// Owns all six rails and the response profile for the process lifetime.
///
/// Single-threaded by design: the control loop visits rails in fixed
/// ascending order, to completion, with no reentrancy.  No rail's state is
/// touched outside its own update/dispatch pair, so there is nothing to
/// lock.
pub struct RailSupervisor {
    rails: [Rail; RailId::COUNT],
    profile: ResponseProfile,
    sweep_count: u64,
}

impl RailSupervisor {
    /// Build the arena from configuration.  Every rail boots healthy and
    /// commanded fully on, stamped with the boot tick.
    pub fn new(config: &SystemConfig, now: Tick) -> Self {
        let rails = RailId::ALL.map(|id| {
            Rail::new(
                id,
                RailConfig {
                    monitor_addr: pins::monitor_addr(id),
                    binding: pins::rail_binding(id),
                    thresholds: config.limits(id),
                },
                now,
            )
        });
        Self {
            rails,
            profile: ResponseProfile::for_profile(config.profile),
            sweep_count: 0,
        }
    }

    /// Announce startup through the sink.
    pub fn start(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!("RailSupervisor started, {} rails", RailId::COUNT);
    }

    // ── Per-sweep orchestration ───────────────────────────────

    /// One full sweep: update every rail in ascending order and dispatch
    /// the ones that changed.  Returns how many rails were dispatched.
    pub fn sweep(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        commands: &mut impl CommandSource,
        sink: &mut impl EventSink,
        now: Tick,
    ) -> usize {
        self.sweep_count += 1;
        let mut dispatched = 0;

        for id in RailId::ALL {
            let before = self.rails[id.index()];

            if self.update_rail(id, hw, commands, now) == UpdateOutcome::Unchanged {
                continue;
            }

            let rail = &self.rails[id.index()];
            if before.fault.is_fault() && !rail.fault.is_fault() {
                sink.emit(&AppEvent::FaultCleared { rail: id, tick: now });
            }
            if rail.pending != before.pending {
                if let Some(command) = accepted_command(rail.pending) {
                    sink.emit(&AppEvent::CommandAccepted { rail: id, command });
                }
            }

            self.dispatch_rail(id, hw, sink);
            dispatched += 1;
        }
        dispatched
    }

    // ── Updater ───────────────────────────────────────────────

    /// One evaluation cycle for one rail: re-classify from a fresh read,
    /// latch or time out the fault, and only if neither happened, poll for
    /// a new setpoint.
    ///
    /// Fault handling strictly precedes command ingestion: a rail that is
    /// actively faulting never takes a new command in the same cycle, and
    /// a persisting fault refreshes its timestamp every cycle (so it can
    /// never time out on its own).
    pub fn update_rail(
        &mut self,
        id: RailId,
        sensors: &mut impl SensorPort,
        commands: &mut impl CommandSource,
        now: Tick,
    ) -> UpdateOutcome {
        let rail = &mut self.rails[id.index()];

        match read_monitor(rail.config.monitor_addr, sensors) {
            Ok((voltage_mv, current_ma)) => {
                let kind = rail.config.thresholds.classify(voltage_mv, current_ma);

                if kind.is_fault() {
                    // Latch, refreshing the timestamp even when the kind is
                    // unchanged from the previous cycle.
                    rail.fault = kind;
                    rail.fault_since = now;
                    return UpdateOutcome::Changed;
                }

                // Clean reading: the latched fault may time out.
                if self
                    .profile
                    .timeouts()
                    .is_timed_out(rail.fault, rail.fault_since, now)
                {
                    info!("{}: {} timed out, clearing", rail.id, rail.fault);
                    rail.fault = FaultKind::None;
                    rail.fault_since = now;
                    return UpdateOutcome::Changed;
                }
            }
            Err(e) => {
                // Data unavailable: keep the latched fault and timestamp
                // untouched, and skip the timeout clear too — clearing
                // requires positive evidence of a clean reading.
                debug!("{}: monitor read failed ({e}), skipping classification", rail.id);
            }
        }

        if let Some(cmd) = commands.poll(rail.id) {
            rail.pending = cmd.into();
            return UpdateOutcome::Changed;
        }

        UpdateOutcome::Unchanged
    }

    // ── Dispatcher ────────────────────────────────────────────

    /// Perform the hardware write for a rail the updater marked changed.
    ///
    /// A force-off verdict overrides the pending command for this cycle;
    /// warn and ignore let the command through.  A pending command of
    /// `None` issues no write at all.
    pub fn dispatch_rail(
        &self,
        id: RailId,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let rail = &self.rails[id.index()];

        if rail.fault.is_fault() {
            let severity = self.profile.response(rail.id, rail.fault);

            if severity > Severity::Ignore {
                sink.emit(&AppEvent::FaultReport {
                    rail: rail.id,
                    fault: rail.fault,
                    tick: rail.fault_since,
                });
            }

            if severity == Severity::ForceOff {
                hw.write_duty(rail.config.binding, DUTY_OFF);
                return;
            }
        }

        match rail.pending {
            PendingCommand::On => hw.write_duty(rail.config.binding, DUTY_MAX),
            PendingCommand::Off => hw.write_duty(rail.config.binding, DUTY_OFF),
            PendingCommand::Duty(v) => hw.write_duty(rail.config.binding, v),
            PendingCommand::None => {}
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Read-only view of one rail.
    pub fn rail(&self, id: RailId) -> &Rail {
        &self.rails[id.index()]
    }

    /// Total sweeps executed since startup.
    pub fn sweep_count(&self) -> u64 {
        self.sweep_count
    }

    /// The active response profile.
    pub fn profile(&self) -> &ResponseProfile {
        &self.profile
    }

    /// Build a telemetry snapshot of every rail.
    pub fn build_telemetry(&self, now: Tick) -> TelemetryData {
        TelemetryData {
            tick: now,
            rails: RailId::ALL.map(|id| {
                let rail = self.rail(id);
                RailTelemetry {
                    id,
                    fault: rail.fault,
                    fault_since: rail.fault_since,
                    pending: rail.pending,
                }
            }),
        }
    }
}

/// The command corresponding to a freshly stored pending state, for the
/// acceptance event.
fn accepted_command(pending: PendingCommand) -> Option<crate::app::commands::Command> {
    use crate::app::commands::Command;
    match pending {
        PendingCommand::On => Some(Command::On),
        PendingCommand::Off => Some(Command::Off),
        PendingCommand::Duty(v) => Some(Command::SetDuty(v)),
        PendingCommand::None => None,
    }
}

/// Fetch one rail's voltage/current pair.  Either read failing makes the
/// whole pair unavailable for the cycle.
fn read_monitor(
    addr: u8,
    sensors: &mut impl SensorPort,
) -> Result<(u16, u16), crate::error::SensorError> {
    let voltage_mv = sensors.read_voltage_mv(addr)?;
    let current_ma = sensors.read_current_ma(addr)?;
    Ok((voltage_mv, current_ma))
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::Command;
    use crate::channel::{Profile, Thresholds};
    use crate::error::SensorError;

    // ── Inline mocks ──────────────────────────────────────────

    struct FixedSensors {
        voltage_mv: u16,
        current_ma: u16,
        fail: bool,
    }

    impl SensorPort for FixedSensors {
        fn read_voltage_mv(&mut self, _addr: u8) -> Result<u16, SensorError> {
            if self.fail {
                Err(SensorError::BusReadFailed)
            } else {
                Ok(self.voltage_mv)
            }
        }
        fn read_current_ma(&mut self, _addr: u8) -> Result<u16, SensorError> {
            if self.fail {
                Err(SensorError::BusReadFailed)
            } else {
                Ok(self.current_ma)
            }
        }
    }

    struct NoCommands;
    impl CommandSource for NoCommands {
        fn poll(&mut self, _rail: RailId) -> Option<Command> {
            None
        }
    }

    struct OneCommand(Option<(RailId, Command)>);
    impl CommandSource for OneCommand {
        fn poll(&mut self, rail: RailId) -> Option<Command> {
            match self.0 {
                Some((target, cmd)) if target == rail => {
                    self.0 = None;
                    Some(cmd)
                }
                _ => None,
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink(Vec<AppEvent>);
    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    #[derive(Default)]
    struct RecordingHw(Vec<(u8, u16)>);
    impl ActuatorPort for RecordingHw {
        fn write_duty(&mut self, binding: crate::channel::PwmBinding, duty: u16) {
            self.0.push((binding.sub_channel, duty));
        }
    }

    fn commissioning_supervisor(now: Tick) -> RailSupervisor {
        let mut config = SystemConfig::default();
        config.profile = Profile::Commissioning;
        RailSupervisor::new(&config, now)
    }

    fn narrow_window(sup: &mut RailSupervisor, id: RailId, t: Thresholds) {
        sup.rails[id.index()].config.thresholds = t;
    }

    // ── Updater ───────────────────────────────────────────────

    #[test]
    fn over_voltage_latches_at_current_tick() {
        let mut sup = commissioning_supervisor(0);
        narrow_window(
            &mut sup,
            RailId::Regen,
            Thresholds::new(0x0000, 0x0095, 0x0000, 0xffff).unwrap(),
        );
        let mut sensors = FixedSensors {
            voltage_mv: 0x0096,
            current_ma: 0x0f11,
            fail: false,
        };

        let outcome = sup.update_rail(RailId::Regen, &mut sensors, &mut NoCommands, 293);
        assert_eq!(outcome, UpdateOutcome::Changed);
        assert_eq!(sup.rail(RailId::Regen).fault, FaultKind::OverVoltage);
        assert_eq!(sup.rail(RailId::Regen).fault_since, 293);
    }

    #[test]
    fn persisting_fault_refreshes_timestamp_every_cycle() {
        let mut sup = commissioning_supervisor(0);
        narrow_window(
            &mut sup,
            RailId::Vcu,
            Thresholds::new(0, 100, 0, 0xffff).unwrap(),
        );
        let mut sensors = FixedSensors {
            voltage_mv: 200,
            current_ma: 10,
            fail: false,
        };

        sup.update_rail(RailId::Vcu, &mut sensors, &mut NoCommands, 50);
        assert_eq!(sup.rail(RailId::Vcu).fault_since, 50);
        // Same fault, later tick: timestamp still refreshed.
        sup.update_rail(RailId::Vcu, &mut sensors, &mut NoCommands, 90);
        assert_eq!(sup.rail(RailId::Vcu).fault, FaultKind::OverVoltage);
        assert_eq!(sup.rail(RailId::Vcu).fault_since, 90);
    }

    #[test]
    fn clean_unlatched_rail_reports_unchanged_and_keeps_timestamp() {
        let mut sup = commissioning_supervisor(18);
        let mut sensors = FixedSensors {
            voltage_mv: 12_000,
            current_ma: 100,
            fail: false,
        };

        for now in [100, 200, 300] {
            let outcome = sup.update_rail(RailId::Fans, &mut sensors, &mut NoCommands, now);
            assert_eq!(outcome, UpdateOutcome::Unchanged);
            assert_eq!(sup.rail(RailId::Fans).fault_since, 18);
        }
    }

    #[test]
    fn latched_fault_times_out_strictly_after_period() {
        // Over-voltage has a 13-tick timeout in the commissioning profile.
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Regen.index()].fault = FaultKind::OverVoltage;
        sup.rails[RailId::Regen.index()].fault_since = 199;
        let mut sensors = FixedSensors {
            voltage_mv: 12_000,
            current_ma: 100,
            fail: false,
        };

        // Boundary not yet passed at 199 + 13.
        let outcome = sup.update_rail(RailId::Regen, &mut sensors, &mut NoCommands, 212);
        assert_eq!(outcome, UpdateOutcome::Unchanged);
        assert_eq!(sup.rail(RailId::Regen).fault, FaultKind::OverVoltage);

        // One past the boundary: cleared and restamped.
        let outcome = sup.update_rail(RailId::Regen, &mut sensors, &mut NoCommands, 213);
        assert_eq!(outcome, UpdateOutcome::Changed);
        assert_eq!(sup.rail(RailId::Regen).fault, FaultKind::None);
        assert_eq!(sup.rail(RailId::Regen).fault_since, 213);
    }

    #[test]
    fn sticky_fault_never_times_out() {
        // Under-current has no timeout in the commissioning profile.
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Vcu.index()].fault = FaultKind::UnderCurrent;
        sup.rails[RailId::Vcu.index()].fault_since = 10;
        let mut sensors = FixedSensors {
            voltage_mv: 12_000,
            current_ma: 100,
            fail: false,
        };

        let outcome = sup.update_rail(RailId::Vcu, &mut sensors, &mut NoCommands, 1_000_000);
        assert_eq!(outcome, UpdateOutcome::Unchanged);
        assert_eq!(sup.rail(RailId::Vcu).fault, FaultKind::UnderCurrent);
    }

    #[test]
    fn faulting_cycle_never_ingests_a_command() {
        let mut sup = commissioning_supervisor(0);
        narrow_window(
            &mut sup,
            RailId::Pumps,
            Thresholds::new(0, 100, 0, 0xffff).unwrap(),
        );
        let mut sensors = FixedSensors {
            voltage_mv: 200,
            current_ma: 10,
            fail: false,
        };
        let mut commands = OneCommand(Some((RailId::Pumps, Command::Off)));

        sup.update_rail(RailId::Pumps, &mut sensors, &mut commands, 5);
        // The command is still queued and the pending state untouched.
        assert_eq!(sup.rail(RailId::Pumps).pending, PendingCommand::On);
        assert!(commands.0.is_some());
    }

    #[test]
    fn new_command_is_stored_and_reports_changed() {
        let mut sup = commissioning_supervisor(0);
        let mut sensors = FixedSensors {
            voltage_mv: 12_000,
            current_ma: 100,
            fail: false,
        };
        let mut commands = OneCommand(Some((RailId::Aero, Command::SetDuty(500))));

        let outcome = sup.update_rail(RailId::Aero, &mut sensors, &mut commands, 7);
        assert_eq!(outcome, UpdateOutcome::Changed);
        assert_eq!(sup.rail(RailId::Aero).pending, PendingCommand::Duty(500));
    }

    #[test]
    fn sensor_failure_keeps_latched_state_and_skips_timeout() {
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Regen.index()].fault = FaultKind::OverVoltage;
        sup.rails[RailId::Regen.index()].fault_since = 199;
        let mut sensors = FixedSensors {
            voltage_mv: 0,
            current_ma: 0,
            fail: true,
        };

        // Far past the 13-tick period, but no clean reading to prove it.
        let outcome = sup.update_rail(RailId::Regen, &mut sensors, &mut NoCommands, 10_000);
        assert_eq!(outcome, UpdateOutcome::Unchanged);
        assert_eq!(sup.rail(RailId::Regen).fault, FaultKind::OverVoltage);
        assert_eq!(sup.rail(RailId::Regen).fault_since, 199);
    }

    #[test]
    fn sensor_failure_still_polls_for_commands() {
        let mut sup = commissioning_supervisor(0);
        let mut sensors = FixedSensors {
            voltage_mv: 0,
            current_ma: 0,
            fail: true,
        };
        let mut commands = OneCommand(Some((RailId::Fans, Command::On)));

        let outcome = sup.update_rail(RailId::Fans, &mut sensors, &mut commands, 3);
        assert_eq!(outcome, UpdateOutcome::Changed);
        assert_eq!(sup.rail(RailId::Fans).pending, PendingCommand::On);
    }

    // ── Dispatcher ────────────────────────────────────────────

    #[test]
    fn force_off_overrides_pending_command() {
        // (Pumps, OverVoltage) → ForceOff in the commissioning matrix.
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Pumps.index()].fault = FaultKind::OverVoltage;
        sup.rails[RailId::Pumps.index()].fault_since = 42;
        sup.rails[RailId::Pumps.index()].pending = PendingCommand::Duty(900);

        let mut hw = RecordingHw::default();
        let mut sink = RecordingSink::default();
        sup.dispatch_rail(RailId::Pumps, &mut hw, &mut sink);

        // Exactly one write: duty 0, and the pending 900 never applied.
        let binding = sup.rail(RailId::Pumps).config.binding;
        assert_eq!(hw.0, vec![(binding.sub_channel, DUTY_OFF)]);
        assert!(matches!(
            sink.0.as_slice(),
            [AppEvent::FaultReport {
                rail: RailId::Pumps,
                fault: FaultKind::OverVoltage,
                tick: 42,
            }]
        ));
    }

    #[test]
    fn warn_reports_and_still_applies_command() {
        // (Vcu, OverVoltage) → Warn in the commissioning matrix.
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Vcu.index()].fault = FaultKind::OverVoltage;
        sup.rails[RailId::Vcu.index()].pending = PendingCommand::Duty(500);

        let mut hw = RecordingHw::default();
        let mut sink = RecordingSink::default();
        sup.dispatch_rail(RailId::Vcu, &mut hw, &mut sink);

        let binding = sup.rail(RailId::Vcu).config.binding;
        assert_eq!(hw.0, vec![(binding.sub_channel, 500)]);
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn ignored_fault_neither_reports_nor_blocks() {
        // (Shutdown, OverVoltage) → Ignore in the commissioning matrix.
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Shutdown.index()].fault = FaultKind::OverVoltage;

        let mut hw = RecordingHw::default();
        let mut sink = RecordingSink::default();
        sup.dispatch_rail(RailId::Shutdown, &mut hw, &mut sink);

        let binding = sup.rail(RailId::Shutdown).config.binding;
        assert_eq!(hw.0, vec![(binding.sub_channel, DUTY_MAX)]); // boot command On
        assert!(sink.0.is_empty());
    }

    #[test]
    fn command_translation_table() {
        let mut sup = commissioning_supervisor(0);
        let binding = sup.rail(RailId::Fans).config.binding;
        let mut sink = RecordingSink::default();

        for (pending, expected) in [
            (PendingCommand::On, Some(DUTY_MAX)),
            (PendingCommand::Off, Some(DUTY_OFF)),
            (PendingCommand::Duty(500), Some(500)),
            (PendingCommand::None, None),
        ] {
            sup.rails[RailId::Fans.index()].pending = pending;
            let mut hw = RecordingHw::default();
            sup.dispatch_rail(RailId::Fans, &mut hw, &mut sink);
            match expected {
                Some(duty) => assert_eq!(hw.0, vec![(binding.sub_channel, duty)]),
                None => assert!(hw.0.is_empty(), "NoCommand must issue zero writes"),
            }
        }
    }

    // ── Sweep ─────────────────────────────────────────────────

    struct SensorsAndHw {
        sensors: FixedSensors,
        hw: RecordingHw,
    }
    impl SensorPort for SensorsAndHw {
        fn read_voltage_mv(&mut self, addr: u8) -> Result<u16, SensorError> {
            self.sensors.read_voltage_mv(addr)
        }
        fn read_current_ma(&mut self, addr: u8) -> Result<u16, SensorError> {
            self.sensors.read_current_ma(addr)
        }
    }
    impl ActuatorPort for SensorsAndHw {
        fn write_duty(&mut self, binding: crate::channel::PwmBinding, duty: u16) {
            self.hw.write_duty(binding, duty);
        }
    }

    #[test]
    fn quiet_sweep_dispatches_nothing() {
        let mut sup = commissioning_supervisor(0);
        let mut hw = SensorsAndHw {
            sensors: FixedSensors {
                voltage_mv: 12_000,
                current_ma: 100,
                fail: false,
            },
            hw: RecordingHw::default(),
        };
        let mut sink = RecordingSink::default();

        let dispatched = sup.sweep(&mut hw, &mut NoCommands, &mut sink, 100);
        assert_eq!(dispatched, 0);
        assert!(hw.hw.0.is_empty());
        assert_eq!(sup.sweep_count(), 1);
    }

    #[test]
    fn timeout_clear_emits_fault_cleared_and_rewrites_command() {
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Regen.index()].fault = FaultKind::OverVoltage;
        sup.rails[RailId::Regen.index()].fault_since = 199;
        let mut hw = SensorsAndHw {
            sensors: FixedSensors {
                voltage_mv: 12_000,
                current_ma: 100,
                fail: false,
            },
            hw: RecordingHw::default(),
        };
        let mut sink = RecordingSink::default();

        let dispatched = sup.sweep(&mut hw, &mut NoCommands, &mut sink, 213);
        assert_eq!(dispatched, 1);
        assert!(sink
            .0
            .iter()
            .any(|e| matches!(e, AppEvent::FaultCleared { rail: RailId::Regen, tick: 213 })));
        // The boot "On" command is re-applied once the fault is gone.
        let binding = sup.rail(RailId::Regen).config.binding;
        assert_eq!(hw.hw.0, vec![(binding.sub_channel, DUTY_MAX)]);
    }

    #[test]
    fn accepted_command_is_announced_and_applied() {
        let mut sup = commissioning_supervisor(0);
        let mut hw = SensorsAndHw {
            sensors: FixedSensors {
                voltage_mv: 12_000,
                current_ma: 100,
                fail: false,
            },
            hw: RecordingHw::default(),
        };
        let mut sink = RecordingSink::default();
        let mut commands = OneCommand(Some((RailId::Pumps, Command::SetDuty(1234))));

        let dispatched = sup.sweep(&mut hw, &mut commands, &mut sink, 50);
        assert_eq!(dispatched, 1);
        assert!(sink.0.iter().any(|e| matches!(
            e,
            AppEvent::CommandAccepted {
                rail: RailId::Pumps,
                command: Command::SetDuty(1234),
            }
        )));
        let binding = sup.rail(RailId::Pumps).config.binding;
        assert_eq!(hw.hw.0, vec![(binding.sub_channel, 1234)]);
    }

    #[test]
    fn telemetry_reflects_rail_state() {
        let mut sup = commissioning_supervisor(0);
        sup.rails[RailId::Aero.index()].fault = FaultKind::UnderVoltage;
        sup.rails[RailId::Aero.index()].fault_since = 77;

        let telem = sup.build_telemetry(80);
        assert_eq!(telem.tick, 80);
        let aero = telem.rails[RailId::Aero.index()];
        assert_eq!(aero.fault, FaultKind::UnderVoltage);
        assert_eq!(aero.fault_since, 77);
    }
}
