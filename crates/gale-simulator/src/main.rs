//! Desktop simulator for the gale weather station.
//!
//! Runs the real `gale-core` poll loop against synthetic sensors, a logging
//! display and an in-memory feed store, so the upload and retry behaviour
//! can be watched without hardware.
//!
//! # Environment
//!
//! Read from the process environment or a `.env` file.
//!
//! | Variable             | Meaning                                            |
//! |----------------------|----------------------------------------------------|
//! | `GALE_CONFIG`        | Path to a JSON `StationConfig`                     |
//! | `GALE_FEED_GROUP`    | Path to a JSON feed group served by the store      |
//! | `GALE_REFRESH_SECS`  | Override the refresh interval                      |
//! | `GALE_FAILURE_EVERY` | Drop the link on every n-th feed write             |
//! | `GALE_CELSIUS`       | Show °C instead of °F on the display log           |
//! | `RUST_LOG`           | Log filter, `info` by default                      |

mod sim;

use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use log::{error, info};

use gale_core::config::StationConfig;
use gale_core::sensors::Sensors;
use gale_core::station::Station;
use gale_core::telemetry::FeedGroup;

use crate::sim::{
    Link, LogDisplay, MemoryFeedStore, SimulatedWifi, StdDelay, SyntheticAnemometer,
    SyntheticEnvironment, default_group,
};

fn read_env_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    read_env_optional(key)
        .map(|v| v.parse::<T>().with_context(|| format!("{key}={v} is not valid")))
        .transpose()
}

fn read_file_from_env(key: &str) -> Result<Option<String>> {
    read_env_optional(key)
        .map(|path| {
            std::fs::read_to_string(&path).with_context(|| format!("reading {key} from {path}"))
        })
        .transpose()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Gale simulator starting");

    let config_text = read_file_from_env("GALE_CONFIG")?;
    let mut config = match &config_text {
        Some(text) => serde_json::from_str(text).context("parsing station config")?,
        None => StationConfig::default(),
    };
    if let Some(secs) = parse_env::<u64>("GALE_REFRESH_SECS")? {
        config.refresh_interval_secs = secs;
    }

    let group = match read_file_from_env("GALE_FEED_GROUP")? {
        Some(text) => serde_json::from_str::<FeedGroup>(&text).context("parsing feed group")?,
        None => default_group(config.feed_group),
    };

    let failure_every = parse_env::<u32>("GALE_FAILURE_EVERY")?;
    let celsius = parse_env::<bool>("GALE_CELSIUS")?.unwrap_or(false);

    let link = Link::new();
    let sensors = Sensors::new(
        SyntheticEnvironment::new(),
        SyntheticAnemometer::new(config.anemometer),
    );

    let mut station = Station::new(
        sensors,
        LogDisplay::new(celsius),
        MemoryFeedStore::new(group, link.clone(), failure_every),
        SimulatedWifi::new(link),
        StdDelay,
        config,
    )
    .map_err(|e| anyhow!("station setup failed: {e}"))?;

    let Err(err) = station.run();
    let stats = station.stats();
    error!(
        "Station stopped after {} ({}% published)",
        stats,
        stats.success_rate()
    );

    Err(anyhow!(err.to_string()))
}
