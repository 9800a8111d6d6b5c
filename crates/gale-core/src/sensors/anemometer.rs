//! Analog anemometer conversion.
//!
//! The anemometer outputs a voltage proportional to wind speed. The board reads
//! it through a resistor divider into a 16-bit ADC, so the raw reading has to be
//! scaled back to the sensor's own voltage before it can be mapped onto the
//! sensor's calibrated speed range.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Full-scale value of the 16-bit ADC reading.
pub const ADC_FULL_SCALE: f32 = 65535.0;

/// Wind speed in metres per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct WindSpeed(f32);

impl WindSpeed {
    pub const fn from_meters_per_second(value: f32) -> Self {
        Self(value)
    }

    pub const fn meters_per_second(self) -> f32 {
        self.0
    }
}

impl fmt::Display for WindSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m/s", self.0)
    }
}

/// Calibration of the ADC front end and the anemometer itself.
///
/// The defaults describe the stock station: 3.3 V ADC reference, a divider
/// that scales the sensor output by 1/2.237, and a sensor that outputs
/// 0.4 V at 0 m/s and 2.0 V at 32.4 m/s.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct AnemometerCalibration {
    /// ADC reference voltage
    pub reference_volts: f32,
    /// Factor undoing the resistor divider between sensor and ADC pin
    pub divider_gain: f32,
    /// Sensor output at `min_speed`
    pub min_volts: f32,
    /// Sensor output at `max_speed`
    pub max_volts: f32,
    /// Lowest calibrated speed (m/s)
    pub min_speed: f32,
    /// Highest calibrated speed (m/s)
    pub max_speed: f32,
}

impl Default for AnemometerCalibration {
    fn default() -> Self {
        Self {
            reference_volts: 3.3,
            divider_gain: 2.237,
            min_volts: 0.4,
            max_volts: 2.0,
            min_speed: 0.0,
            max_speed: 32.4,
        }
    }
}

impl AnemometerCalibration {
    /// Voltage at the sensor terminals for a raw ADC reading.
    pub fn sensor_volts(&self, raw_adc: u16) -> f32 {
        let pin_volts = raw_adc as f32 / ADC_FULL_SCALE * self.reference_volts;
        pin_volts * self.divider_gain
    }

    /// Convert a raw ADC reading into wind speed.
    ///
    /// The voltage range is mapped linearly and is NOT clamped: readings below
    /// `min_volts` give speeds under `min_speed` (negative with the stock
    /// calibration) and readings above `max_volts` extrapolate past `max_speed`.
    pub fn wind_speed(&self, raw_adc: u16) -> WindSpeed {
        let volts = self.sensor_volts(raw_adc);
        WindSpeed(map_range(
            volts,
            self.min_volts,
            self.max_volts,
            self.min_speed,
            self.max_speed,
        ))
    }

    /// The calibration can only be inverted when the voltage span is non-empty.
    pub fn is_degenerate(&self) -> bool {
        self.max_volts == self.min_volts
    }
}

/// Convert a raw reading using the stock calibration.
pub fn adc_to_wind_speed(raw_adc: u16) -> WindSpeed {
    AnemometerCalibration::default().wind_speed(raw_adc)
}

/// Unclamped linear interpolation of `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
fn map_range(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One ADC step moves the stock calibration by ~0.0023 m/s.
    const ONE_STEP: f32 = 0.005;

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        let diff = actual - expected;
        assert!(
            diff < tolerance && diff > -tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    fn raw_for_volts(volts: f32) -> u16 {
        (volts / 3.3 / 2.237 * ADC_FULL_SCALE + 0.5) as u16
    }

    #[test]
    fn test_lower_calibration_point_is_calm() {
        let speed = adc_to_wind_speed(raw_for_volts(0.4));
        assert_close(speed.meters_per_second(), 0.0, ONE_STEP);
    }

    #[test]
    fn test_upper_calibration_point_is_max_speed() {
        let speed = adc_to_wind_speed(raw_for_volts(2.0));
        assert_close(speed.meters_per_second(), 32.4, ONE_STEP);
    }

    #[test]
    fn test_mid_scale_extrapolates_past_calibrated_range() {
        let calibration = AnemometerCalibration::default();
        assert_close(calibration.sensor_volts(32767), 3.691, 0.001);

        let speed = calibration.wind_speed(32767).meters_per_second();
        assert!(speed > 32.4, "mid-scale must not be clamped, got {speed}");
        assert_close(speed, 66.643, 0.01);
    }

    #[test]
    fn test_zero_reading_goes_negative() {
        assert_close(adc_to_wind_speed(0).meters_per_second(), -8.1, 0.001);
    }

    #[test]
    fn test_full_scale_reading() {
        assert_close(adc_to_wind_speed(u16::MAX).meters_per_second(), 141.3875, 0.01);
    }

    #[test]
    fn test_monotonic_over_whole_domain() {
        let calibration = AnemometerCalibration::default();
        let mut previous = calibration.wind_speed(0);
        for raw in 1..=u16::MAX {
            let current = calibration.wind_speed(raw);
            assert!(current >= previous, "not monotonic at raw={raw}");
            previous = current;
        }
    }

    #[test]
    fn test_linear_steps_are_uniform() {
        let calibration = AnemometerCalibration::default();
        let a = calibration.wind_speed(10_000).meters_per_second();
        let b = calibration.wind_speed(20_000).meters_per_second();
        let c = calibration.wind_speed(30_000).meters_per_second();
        assert_close(b - a, c - b, 0.001);
    }

    #[test]
    fn test_custom_calibration() {
        let calibration = AnemometerCalibration {
            reference_volts: 3.3,
            divider_gain: 1.0,
            min_volts: 0.0,
            max_volts: 3.3,
            min_speed: 0.0,
            max_speed: 50.0,
        };
        assert_close(calibration.wind_speed(u16::MAX).meters_per_second(), 50.0, 0.001);
        assert!(!calibration.is_degenerate());
    }
}
