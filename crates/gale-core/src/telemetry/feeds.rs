//! Feed targets and their resolution from a remote feed group.
//!
//! The station does not hard-code feed keys. At startup it fetches a named
//! group from the feed store and takes the group's feeds positionally:
//! the first is temperature, the second pressure, the third wind speed.
//! Anything after the third feed is ignored.

use alloc::string::String as AllocString;
use alloc::vec::Vec;
use heapless::String;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use super::{FeedKind, TelemetryBackend, WriteError};

/// Longest feed key the station can address
pub const FEED_KEY_CAPACITY: usize = 128;
/// Longest feed name kept for logging
pub const FEED_NAME_CAPACITY: usize = 64;

/// A feed as described by the feed store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedDescriptor {
    pub name: AllocString,
    pub key: AllocString,
}

/// A named group of feeds, in the shape the feed store returns it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedGroup {
    pub name: AllocString,
    #[serde(default)]
    pub key: AllocString,
    #[serde(default)]
    pub feeds: Vec<FeedDescriptor>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("failed to fetch feed group: {0}")]
    Fetch(WriteError),
    #[error("feed group has {found} feeds, the station needs 3")]
    MissingFeeds { found: usize },
    #[error("feed {field} is {len} bytes long, limit is {limit}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        limit: usize,
    },
}

/// A remote channel a single value is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTarget {
    name: String<FEED_NAME_CAPACITY>,
    key: String<FEED_KEY_CAPACITY>,
}

impl FeedTarget {
    pub fn new(name: &str, key: &str) -> Result<Self, FeedError> {
        Ok(Self {
            name: bounded("name", name)?,
            key: bounded("key", key)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl TryFrom<&FeedDescriptor> for FeedTarget {
    type Error = FeedError;

    fn try_from(value: &FeedDescriptor) -> Result<Self, Self::Error> {
        Self::new(&value.name, &value.key)
    }
}

/// The three feeds the station publishes to. Read-only once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSet {
    temperature: FeedTarget,
    pressure: FeedTarget,
    wind_speed: FeedTarget,
}

impl FeedSet {
    pub const fn new(
        temperature: FeedTarget,
        pressure: FeedTarget,
        wind_speed: FeedTarget,
    ) -> Self {
        Self {
            temperature,
            pressure,
            wind_speed,
        }
    }

    /// Take temperature, pressure and wind speed from the first three descriptors.
    pub fn from_descriptors(feeds: &[FeedDescriptor]) -> Result<Self, FeedError> {
        let [temperature, pressure, wind_speed, ..] = feeds else {
            return Err(FeedError::MissingFeeds { found: feeds.len() });
        };

        Ok(Self::new(
            temperature.try_into()?,
            pressure.try_into()?,
            wind_speed.try_into()?,
        ))
    }

    /// Fetch `group` from the backend and resolve the station's feeds from it.
    pub fn resolve<B>(backend: &mut B, group: &str) -> Result<Self, FeedError>
    where
        B: TelemetryBackend + ?Sized,
    {
        info!("Getting feed group '{}'...", group);
        let feeds = backend.get_feed_group(group).map_err(FeedError::Fetch)?;
        let set = Self::from_descriptors(&feeds)?;

        for kind in FeedKind::PUBLISH_ORDER {
            let target = set.get(kind);
            info!("{} feed: {} ({})", kind, target.name(), target.key());
        }

        Ok(set)
    }

    pub const fn get(&self, kind: FeedKind) -> &FeedTarget {
        match kind {
            FeedKind::Temperature => &self.temperature,
            FeedKind::Pressure => &self.pressure,
            FeedKind::WindSpeed => &self.wind_speed,
        }
    }
}

fn bounded<const N: usize>(field: &'static str, value: &str) -> Result<String<N>, FeedError> {
    let mut out = String::new();
    out.push_str(value).map_err(|_| FeedError::FieldTooLong {
        field,
        len: value.len(),
        limit: N,
    })?;
    Ok(out)
}
