//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the power distribution
//! module: per-rail fault classification, latch and timeout handling, and
//! the output arbitration that turns pending commands into duty writes.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
