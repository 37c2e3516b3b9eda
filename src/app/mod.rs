//! Application core — pure domain logic, zero I/O.
//!
//! This module holds the sampling service, the live [`reading::Reading`],
//! the wire record, and the BLE link state machine.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod link;
pub mod ports;
pub mod reading;
pub mod record;
pub mod service;
