pub mod anemometer;

pub use anemometer::{AnemometerCalibration, WindSpeed, adc_to_wind_speed};

/// Temperature and barometric pressure source (a BME280 on the stock board).
///
/// Reads are treated as instantaneous and infallible; a driver that can fail
/// is expected to log and report its last good value.
pub trait EnvironmentalSensor {
    /// Temperature in °C.
    fn temperature(&mut self) -> f32;

    /// Pressure in hPa (mbar).
    fn pressure(&mut self) -> f32;
}

/// The anemometer's ADC channel.
pub trait WindSensor {
    /// Raw 16-bit reading, full scale at `u16::MAX`.
    fn read(&mut self) -> u16;
}

/// One sample of every station sensor, taken once per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f32,
    pub pressure: f32,
    pub raw_wind_adc: u16,
}

/// The station's sensors, sampled together.
pub struct Sensors<E, W> {
    environment: E,
    wind: W,
}

impl<E, W> Sensors<E, W>
where
    E: EnvironmentalSensor,
    W: WindSensor,
{
    pub const fn new(environment: E, wind: W) -> Self {
        Self { environment, wind }
    }

    /// Read every sensor once.
    pub fn sample(&mut self) -> SensorReading {
        SensorReading {
            temperature: self.environment.temperature(),
            pressure: self.environment.pressure(),
            raw_wind_adc: self.wind.read(),
        }
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn wind(&self) -> &W {
        &self.wind
    }
}
