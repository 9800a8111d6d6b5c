//! Simulated station hardware and feed store.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use gale_core::display::WeatherDisplay;
use gale_core::network::NetworkManager;
use gale_core::sensors::{
    AnemometerCalibration, EnvironmentalSensor, SensorReading, WindSensor, WindSpeed,
};
use gale_core::telemetry::{
    FeedDescriptor, FeedGroup, RequestError, TelemetryBackend, TransientError, WriteError,
};

/// Seconds since the simulator started, as `f64`.
fn elapsed_secs(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}

/// Slowly drifting temperature and pressure.
pub struct SyntheticEnvironment {
    started: Instant,
}

impl SyntheticEnvironment {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl EnvironmentalSensor for SyntheticEnvironment {
    fn temperature(&mut self) -> f32 {
        let t = elapsed_secs(self.started);
        // 12–20 °C with a short wobble on top of the slow swing
        (16.0 + 4.0 * (t / 600.0).sin() + 0.3 * (t / 47.0).cos()) as f32
    }

    fn pressure(&mut self) -> f32 {
        let t = elapsed_secs(self.started);
        (1013.25 + 6.0 * (t / 1800.0).sin()) as f32
    }
}

/// Gusty wind, reported as the ADC reading the anemometer would produce.
pub struct SyntheticAnemometer {
    started: Instant,
    calibration: AnemometerCalibration,
}

impl SyntheticAnemometer {
    pub fn new(calibration: AnemometerCalibration) -> Self {
        Self {
            started: Instant::now(),
            calibration,
        }
    }

    /// Invert the calibration: wind speed to raw ADC counts.
    fn raw_for_speed(&self, speed: f32) -> u16 {
        let c = &self.calibration;
        let volts = (speed - c.min_speed) * (c.max_volts - c.min_volts)
            / (c.max_speed - c.min_speed)
            + c.min_volts;
        let counts = volts / c.divider_gain / c.reference_volts * 65535.0;
        counts.round().clamp(0.0, f32::from(u16::MAX)) as u16
    }
}

impl WindSensor for SyntheticAnemometer {
    fn read(&mut self) -> u16 {
        let t = elapsed_secs(self.started);
        // 2–14 m/s base wind with gusts
        let speed = 8.0 + 6.0 * (t / 240.0).sin() + 3.0 * (t / 13.0).sin().max(0.0);
        self.raw_for_speed(speed as f32)
    }
}

/// Logs what the station's screen would show.
pub struct LogDisplay {
    celsius: bool,
}

impl LogDisplay {
    pub fn new(celsius: bool) -> Self {
        Self { celsius }
    }
}

impl WeatherDisplay for LogDisplay {
    fn render(&mut self, reading: &SensorReading, wind_speed: WindSpeed) {
        if self.celsius {
            info!("[display] Temp: {:.1}°C", reading.temperature);
        } else {
            info!("[display] Temp: {:.1}°F", reading.temperature * 9.0 / 5.0 + 32.0);
        }
        info!("[display] Wind Speed {}", wind_speed);
        info!("[display] Pres: {:.2} mbar", reading.pressure);
    }

    fn set_status(&mut self, text: &str) {
        info!("[display] status: {}", text);
    }
}

/// Shared flag standing in for the Wi-Fi association.
#[derive(Clone)]
pub struct Link(Rc<Cell<bool>>);

impl Link {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    fn is_up(&self) -> bool {
        self.0.get()
    }

    fn set_up(&self, up: bool) {
        self.0.set(up);
    }
}

/// Network manager that brings the simulated link back up.
pub struct SimulatedWifi {
    link: Link,
    resets: u32,
}

impl SimulatedWifi {
    pub fn new(link: Link) -> Self {
        Self { link, resets: 0 }
    }
}

impl NetworkManager for SimulatedWifi {
    fn reset(&mut self) {
        self.resets += 1;
        warn!("[wifi] resetting connection (reset #{})", self.resets);
        self.link.set_up(true);
    }
}

/// In-memory feed store.
///
/// With `failure_every` set, every n-th write drops the link, and writes keep
/// failing until the network manager resets it.
pub struct MemoryFeedStore {
    group: FeedGroup,
    feeds: HashMap<String, Vec<f32>>,
    link: Link,
    failure_every: Option<u32>,
    writes: u32,
}

impl MemoryFeedStore {
    pub fn new(group: FeedGroup, link: Link, failure_every: Option<u32>) -> Self {
        let feeds = group
            .feeds
            .iter()
            .map(|feed| (feed.key.clone(), Vec::new()))
            .collect();

        Self {
            group,
            feeds,
            link,
            failure_every: failure_every.filter(|n| *n > 0),
            writes: 0,
        }
    }
}

impl TelemetryBackend for MemoryFeedStore {
    fn write(&mut self, feed_key: &str, value: f32) -> Result<(), WriteError> {
        if !self.link.is_up() {
            return Err(TransientError::Disconnected.into());
        }

        self.writes += 1;
        if self.failure_every.is_some_and(|n| self.writes % n == 0) {
            self.link.set_up(false);
            return Err(TransientError::Socket.into());
        }

        let Some(values) = self.feeds.get_mut(feed_key) else {
            return Err(RequestError::new(404, "feed not found").into());
        };
        values.push(value);
        debug!(
            "[feeds] {} <- {} ({} points)",
            feed_key,
            value,
            values.len()
        );
        Ok(())
    }

    fn get_feed_group(&mut self, name: &str) -> Result<Vec<FeedDescriptor>, WriteError> {
        if !self.link.is_up() {
            return Err(TransientError::Disconnected.into());
        }
        if name != self.group.key {
            return Err(RequestError::new(404, "group not found").into());
        }
        Ok(self.group.feeds.clone())
    }
}

/// Feed group served when no `GALE_FEED_GROUP` file is given.
pub fn default_group(key: &str) -> FeedGroup {
    let feed = |name: &str, suffix: &str| FeedDescriptor {
        name: name.to_string(),
        key: format!("{key}.{suffix}"),
    };

    FeedGroup {
        name: "Weather Station".to_string(),
        key: key.to_string(),
        feeds: vec![
            feed("Temperature", "temperature"),
            feed("Pressure", "pressure"),
            feed("Wind Speed", "wind-speed"),
        ],
    }
}

/// Blocking delay backed by the OS scheduler.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
