use derivative::Derivative;
use scoreboard_common::{
    config::{LiveFeed, ScheduleFeed, Timing},
    teams::TeamId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Derivative, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
pub enum Output {
    #[derivative(Default)]
    Log,
    Json,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub team: TeamId,
    pub output: Output,
    pub timing: Timing,
    pub live_feed: LiveFeed,
    pub schedule_feed: ScheduleFeed,
}
