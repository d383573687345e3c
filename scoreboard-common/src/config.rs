use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, DurationSecondsWithFrac, serde_as};
use std::time::Duration;
use time::UtcOffset;

/// Every timing constant the polling engine depends on
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Minimum time between polls of the live feed while a game is live
    #[serde_as(as = "DurationSeconds<u64>")]
    pub live_poll_interval: Duration,
    /// Minimum time between polls of the live feed while waiting for a game to start
    #[serde_as(as = "DurationSeconds<u64>")]
    pub idle_poll_interval: Duration,
    /// How old the next game lookup can get before an idle poll repeats it
    #[serde_as(as = "DurationSeconds<u64>")]
    pub schedule_refresh_interval: Duration,
    /// Seconds the displayed clock is held behind the feed when a game is first seen
    pub display_delay: u32,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub tick_period: Duration,
    /// How late a clock tick can be before the ticker is re-anchored instead of catching up
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub stall_threshold: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub reanchor_offset: Duration,
    /// Period of the main loop, each iteration emits one frame
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub frame_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            live_poll_interval: Duration::from_secs(20),
            idle_poll_interval: Duration::from_secs(300),
            schedule_refresh_interval: Duration::from_secs(3600),
            display_delay: 30,
            tick_period: Duration::from_secs(1),
            stall_threshold: Duration::from_millis(250),
            reanchor_offset: Duration::from_millis(750),
            frame_interval: Duration::from_millis(100),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveFeed {
    pub url: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self {
            url: "https://cdn.nba.com/static/json/liveData/scoreboard/todaysScoreboard_00.json"
                .to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFeed {
    pub url: String,
    pub api_key: String,
    /// Dates and start times are shown in this offset
    pub timezone: UtcOffset,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for ScheduleFeed {
    fn default() -> Self {
        Self {
            url: "https://api.balldontlie.io".to_string(),
            api_key: String::new(),
            timezone: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
            timeout: Duration::from_secs(10),
        }
    }
}
