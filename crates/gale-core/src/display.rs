//! Display boundary.
//!
//! Layout, fonts and the splash bitmap belong to the board's display driver.
//! The poll loop only pushes fresh readings and short upload status lines.

use crate::sensors::{SensorReading, WindSpeed};

/// Status shown while an upload is in flight.
pub const STATUS_SENDING: &str = "Sending data";
/// Status shown once every feed accepted its value.
pub const STATUS_SENT: &str = "Data sent";

/// A sink for station readings. Both calls are fire-and-forget.
pub trait WeatherDisplay {
    /// Show the latest reading and the wind speed derived from it.
    fn render(&mut self, reading: &SensorReading, wind_speed: WindSpeed);

    /// Replace the upload status line.
    fn set_status(&mut self, text: &str);
}
