//! Scripted collaborators shared by the unit tests.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::display::WeatherDisplay;
use crate::network::NetworkManager;
use crate::sensors::{EnvironmentalSensor, SensorReading, WindSensor, WindSpeed};
use crate::telemetry::{FeedDescriptor, FeedSet, TelemetryBackend, WriteError};

pub fn descriptor(name: &str, key: &str) -> FeedDescriptor {
    FeedDescriptor {
        name: name.to_string(),
        key: key.to_string(),
    }
}

/// Feeds in the order the station expects: temperature, pressure, wind speed.
pub fn station_group() -> Vec<FeedDescriptor> {
    alloc::vec![
        descriptor("Temperature", "station.temperature"),
        descriptor("Pressure", "station.pressure"),
        descriptor("Wind Speed", "station.wind-speed"),
    ]
}

pub fn feed_set() -> FeedSet {
    FeedSet::from_descriptors(&station_group()).unwrap()
}

/// Feed store that records writes and fails the attempts it was told to.
pub struct MockBackend {
    writes: Vec<(String, f32)>,
    attempts: usize,
    failures: Vec<(usize, WriteError)>,
    group: Vec<FeedDescriptor>,
    group_failure: Option<WriteError>,
    group_requests: Vec<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            attempts: 0,
            failures: Vec::new(),
            group: station_group(),
            group_failure: None,
            group_requests: Vec::new(),
        }
    }

    /// Fail the write with the given zero-based attempt number.
    pub fn fail_write(&mut self, attempt: usize, error: WriteError) {
        self.failures.push((attempt, error));
    }

    pub fn fail_group(&mut self, error: WriteError) {
        self.group_failure = Some(error);
    }

    pub fn set_group(&mut self, group: Vec<FeedDescriptor>) {
        self.group = group;
    }

    /// Accepted writes, oldest first.
    pub fn written(&self) -> Vec<(&str, f32)> {
        self.writes
            .iter()
            .map(|(key, value)| (key.as_str(), *value))
            .collect()
    }

    /// Every write call, accepted or not.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn group_requests(&self) -> Vec<&str> {
        self.group_requests.iter().map(String::as_str).collect()
    }
}

impl TelemetryBackend for MockBackend {
    fn write(&mut self, feed_key: &str, value: f32) -> Result<(), WriteError> {
        let attempt = self.attempts;
        self.attempts += 1;

        if let Some(index) = self.failures.iter().position(|(at, _)| *at == attempt) {
            return Err(self.failures.remove(index).1);
        }

        self.writes.push((feed_key.to_string(), value));
        Ok(())
    }

    fn get_feed_group(&mut self, name: &str) -> Result<Vec<FeedDescriptor>, WriteError> {
        self.group_requests.push(name.to_string());
        match self.group_failure.take() {
            Some(error) => Err(error),
            None => Ok(self.group.clone()),
        }
    }
}

/// Environmental sensor replaying fixed values.
pub struct StaticEnvironment {
    pub temperature: f32,
    pub pressure: f32,
}

impl EnvironmentalSensor for StaticEnvironment {
    fn temperature(&mut self) -> f32 {
        self.temperature
    }

    fn pressure(&mut self) -> f32 {
        self.pressure
    }
}

/// ADC replaying a script, repeating the last value once exhausted.
pub struct ScriptedAdc {
    script: Vec<u16>,
    reads: usize,
}

impl ScriptedAdc {
    pub fn new(script: &[u16]) -> Self {
        Self {
            script: script.to_vec(),
            reads: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl WindSensor for ScriptedAdc {
    fn read(&mut self) -> u16 {
        let value = self
            .script
            .get(self.reads)
            .or(self.script.last())
            .copied()
            .unwrap_or(0);
        self.reads += 1;
        value
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<(SensorReading, WindSpeed)>,
    pub statuses: Vec<String>,
}

impl WeatherDisplay for RecordingDisplay {
    fn render(&mut self, reading: &SensorReading, wind_speed: WindSpeed) {
        self.frames.push((*reading, wind_speed));
    }

    fn set_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }
}

#[derive(Default)]
pub struct CountingNetwork {
    pub resets: usize,
}

impl NetworkManager for CountingNetwork {
    fn reset(&mut self) {
        self.resets += 1;
    }
}

/// Delay that records requested sleeps instead of blocking.
#[derive(Default)]
pub struct RecordingDelay {
    pub sleeps_ms: Vec<u32>,
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}
