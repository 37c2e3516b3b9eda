//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them; the shipped one writes the
//! serial console.

use crate::error::CommsError;
use crate::quality::WaterStatus;

use super::reading::Reading;
use super::record::StatusRecord;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot finished and the loop is about to start.
    Started { motion_available: bool },

    /// The IMU is missing; motion values will be simulated.
    DegradedMode,

    /// The IMU is missing and policy says stop.
    Halted,

    /// One sampling cycle finished.  Carries the full reading.
    CycleCompleted(Reading),

    /// Classification changed between two cycles.
    StatusChanged { from: WaterStatus, to: WaterStatus },

    /// A record went out to the subscriber.
    RecordPublished(StatusRecord),

    /// Publishing failed; the next notify tick retries.
    PublishFailed(CommsError),

    SubscriberConnected,
    SubscriberDisconnected,
    AdvertisingRestarted,
}
