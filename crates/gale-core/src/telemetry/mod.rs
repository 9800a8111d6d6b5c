//! Telemetry publishing
//!
//! Readings are uploaded to a remote feed store: one scalar write per feed,
//! addressed by the feed's key. The store itself (Adafruit IO on the stock
//! station) sits behind [`TelemetryBackend`].
//!
//! Failures come in two classes that the poll loop treats differently:
//! - [`RequestError`]: the service answered and refused the write
//!   (unknown feed key, throttled account, ...). Retrying will not help.
//! - [`TransientError`]: the request never completed (socket dropped,
//!   timeout, garbled response). Resetting the network usually fixes it.

pub mod feeds;

use core::fmt;

use alloc::vec::Vec;
use heapless::String;
use log::debug;
use thiserror_no_std::Error;

use crate::sensors::{SensorReading, WindSpeed};

pub use feeds::{FeedDescriptor, FeedError, FeedGroup, FeedSet, FeedTarget};

/// Longest rejection reason kept from a service response
pub const REASON_CAPACITY: usize = 64;

/// The service refused a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request rejected with status {status}: {reason}")]
pub struct RequestError {
    pub status: u16,
    pub reason: String<REASON_CAPACITY>,
}

impl RequestError {
    /// Build a rejection, truncating `reason` to [`REASON_CAPACITY`] bytes.
    pub fn new(status: u16, reason: &str) -> Self {
        let mut truncated = String::new();
        for c in reason.chars() {
            if truncated.push(c).is_err() {
                break;
            }
        }
        Self {
            status,
            reason: truncated,
        }
    }
}

/// A request that failed before the service could answer it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    #[error("network disconnected")]
    Disconnected,
    #[error("request timed out")]
    Timeout,
    #[error("malformed response")]
    MalformedResponse,
    #[error("socket error")]
    Socket,
}

/// Failure of a single backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("{0}")]
    Rejected(RequestError),
    #[error("{0}")]
    Transient(TransientError),
}

impl From<RequestError> for WriteError {
    fn from(value: RequestError) -> Self {
        Self::Rejected(value)
    }
}

impl From<TransientError> for WriteError {
    fn from(value: TransientError) -> Self {
        Self::Transient(value)
    }
}

/// Which station feed a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Temperature,
    Pressure,
    WindSpeed,
}

impl FeedKind {
    /// Order in which [`publish`] writes the feeds.
    pub const PUBLISH_ORDER: [FeedKind; 3] =
        [FeedKind::WindSpeed, FeedKind::Temperature, FeedKind::Pressure];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Pressure => "pressure",
            Self::WindSpeed => "wind speed",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse failure class, used by the poll loop to pick a recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The service refused the write; not recovered locally.
    Rejected,
    /// The write did not complete; recovered by a network reset.
    Transient,
}

/// Failure of a [`publish`] call, naming the feed whose write failed.
///
/// Writes that completed before the failing one are not rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("{feed} feed rejected the write: {cause}")]
    Rejected { feed: FeedKind, cause: RequestError },
    #[error("{feed} feed write failed: {cause}")]
    Transient { feed: FeedKind, cause: TransientError },
}

impl PublishError {
    fn from_write(feed: FeedKind, cause: WriteError) -> Self {
        match cause {
            WriteError::Rejected(cause) => Self::Rejected { feed, cause },
            WriteError::Transient(cause) => Self::Transient { feed, cause },
        }
    }

    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Rejected { .. } => ErrorClass::Rejected,
            Self::Transient { .. } => ErrorClass::Transient,
        }
    }

    /// The feed whose write failed.
    pub const fn feed(&self) -> FeedKind {
        match self {
            Self::Rejected { feed, .. } | Self::Transient { feed, .. } => *feed,
        }
    }
}

/// Remote feed store.
pub trait TelemetryBackend {
    /// Append `value` to the feed identified by `feed_key`.
    fn write(&mut self, feed_key: &str, value: f32) -> Result<(), WriteError>;

    /// Fetch the feeds of a named group. Called once at startup.
    fn get_feed_group(&mut self, name: &str) -> Result<Vec<FeedDescriptor>, WriteError>;
}

/// Upload one reading: wind speed first, then temperature, then pressure.
///
/// Stops at the first failing write. Values already accepted by the service
/// stay delivered, so a retried publish may duplicate them.
pub fn publish<B>(
    backend: &mut B,
    reading: &SensorReading,
    wind_speed: WindSpeed,
    feeds: &FeedSet,
) -> Result<(), PublishError>
where
    B: TelemetryBackend + ?Sized,
{
    for feed in FeedKind::PUBLISH_ORDER {
        let value = match feed {
            FeedKind::WindSpeed => wind_speed.meters_per_second(),
            FeedKind::Temperature => reading.temperature,
            FeedKind::Pressure => reading.pressure,
        };
        let target = feeds.get(feed);

        backend
            .write(target.key(), value)
            .map_err(|cause| PublishError::from_write(feed, cause))?;

        debug!("Sent {} = {} to feed '{}'", feed, value, target.key());
    }

    Ok(())
}
