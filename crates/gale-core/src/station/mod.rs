//! The station poll loop
//!
//! Every iteration samples the sensors, derives wind speed, refreshes the
//! display and uploads the reading. Upload failures are split by class:
//!
//! - transient failures reset the network and restart the loop at once,
//!   skipping the refresh pause;
//! - rejected writes are wrapped into [`StationError::Telemetry`] and returned
//!   to the caller. Nothing inside the loop recovers from them.
//!
//! [`Station::tick`] runs a single iteration and reports how long the caller
//! should wait before the next one, for use from an external scheduler.
//! [`Station::run`] is the blocking driver used on the board.

mod stats;

pub use stats::LoopStats;

use core::convert::Infallible;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::config::{ConfigError, StationConfig};
use crate::display::{STATUS_SENDING, STATUS_SENT, WeatherDisplay};
use crate::network::NetworkManager;
use crate::sensors::{EnvironmentalSensor, Sensors, WindSensor};
use crate::telemetry::{self, ErrorClass, FeedError, FeedSet, PublishError, TelemetryBackend};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    #[error("invalid configuration: {0}")]
    Config(ConfigError),
    #[error("feed setup failed: {0}")]
    Feeds(FeedError),
    #[error("IO Error: {0}")]
    Telemetry(PublishError),
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every feed accepted the reading; wait a full refresh interval.
    Published,
    /// A transient failure reset the network; sample again immediately.
    NetworkReset,
}

impl TickOutcome {
    /// Pause before the next iteration, if any.
    pub const fn delay(self, refresh_interval: Duration) -> Option<Duration> {
        match self {
            Self::Published => Some(refresh_interval),
            Self::NetworkReset => None,
        }
    }
}

/// Everything the poll loop needs, built once at startup.
pub struct Station<'a, E, W, V, B, N, D>
where
    E: EnvironmentalSensor,
    W: WindSensor,
    V: WeatherDisplay,
    B: TelemetryBackend,
    N: NetworkManager,
    D: DelayNs,
{
    sensors: Sensors<E, W>,
    display: V,
    backend: B,
    network: N,
    delay: D,
    feeds: FeedSet,
    config: StationConfig<'a>,
    stats: LoopStats,
}

impl<'a, E, W, V, B, N, D> Station<'a, E, W, V, B, N, D>
where
    E: EnvironmentalSensor,
    W: WindSensor,
    V: WeatherDisplay,
    B: TelemetryBackend,
    N: NetworkManager,
    D: DelayNs,
{
    /// Validate `config` and resolve the station's feeds from its feed group.
    pub fn new(
        sensors: Sensors<E, W>,
        display: V,
        mut backend: B,
        network: N,
        delay: D,
        config: StationConfig<'a>,
    ) -> Result<Self, StationError> {
        config.validate().map_err(StationError::Config)?;
        let feeds =
            FeedSet::resolve(&mut backend, config.feed_group).map_err(StationError::Feeds)?;

        Ok(Self {
            sensors,
            display,
            backend,
            network,
            delay,
            feeds,
            config,
            stats: LoopStats::default(),
        })
    }

    /// Run one sample, display and upload pass.
    pub fn tick(&mut self) -> Result<TickOutcome, StationError> {
        self.stats.iterations += 1;

        let reading = self.sensors.sample();
        let wind_speed = self.config.anemometer.wind_speed(reading.raw_wind_adc);
        debug!(
            "Temperature: {:.1} C, Pressure: {:.2} hPa, Wind Speed: {} (raw {})",
            reading.temperature, reading.pressure, wind_speed, reading.raw_wind_adc
        );

        self.display.render(&reading, wind_speed);

        info!("Sending data to feed store");
        self.display.set_status(STATUS_SENDING);

        match telemetry::publish(&mut self.backend, &reading, wind_speed, &self.feeds) {
            Ok(()) => {
                self.display.set_status(STATUS_SENT);
                self.stats.published += 1;
                info!("Data sent");
                Ok(TickOutcome::Published)
            }
            Err(err) => match err.class() {
                ErrorClass::Transient => {
                    warn!("Failed to send data, resetting network: {}", err);
                    self.network.reset();
                    self.stats.network_resets += 1;
                    Ok(TickOutcome::NetworkReset)
                }
                // Not retried here: the caller decides whether the station survives.
                ErrorClass::Rejected => {
                    error!("Feed store rejected data: {}", err);
                    Err(StationError::Telemetry(err))
                }
            },
        }
    }

    /// Poll forever. Returns only when the feed store rejects a write.
    pub fn run(&mut self) -> Result<Infallible, StationError> {
        let refresh_interval = self.config.refresh_interval();
        info!(
            "Station running, refresh every {}s",
            refresh_interval.as_secs()
        );

        loop {
            let outcome = self.tick()?;
            if let Some(pause) = outcome.delay(refresh_interval) {
                sleep_for(&mut self.delay, pause);
            }
        }
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn feeds(&self) -> &FeedSet {
        &self.feeds
    }

    pub fn config(&self) -> &StationConfig<'a> {
        &self.config
    }

    pub fn sensors(&self) -> &Sensors<E, W> {
        &self.sensors
    }

    pub fn display(&self) -> &V {
        &self.display
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}

/// Block for `pause`, in `u32::MAX` ms chunks when it does not fit one `delay_ms` call.
fn sleep_for<D: DelayNs>(delay: &mut D, pause: Duration) {
    let mut remaining = pause.as_millis();
    while remaining > 0 {
        let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
        delay.delay_ms(chunk);
        remaining -= u128::from(chunk);
    }
}
