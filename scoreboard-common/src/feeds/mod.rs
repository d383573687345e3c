use crate::{
    config::{LiveFeed, ScheduleFeed},
    game_snapshot::{GameSnapshot, ScheduleEntry},
    teams::TeamId,
};
use reqwest::StatusCode;
use std::future::Future;
use thiserror::Error;
use time::OffsetDateTime;

pub mod live;
pub mod schedule;

use live::LiveScoreboardClient;
use schedule::ScheduleClient;

/// Where the engine gets its games from.
///
/// Implementations should report a failure as an error rather than a default snapshot, callers
/// treat any error as "nothing new this round".
pub trait ScoreSource {
    /// Finds today's game for `team` on the live scoreboard
    fn fetch_live(&self, team: TeamId) -> impl Future<Output = Result<GameSnapshot, FetchError>>;

    /// Finds the nearest game for `team` starting today or later
    fn fetch_next(&self, team: TeamId)
    -> impl Future<Output = Result<ScheduleEntry, FetchError>>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server responded with {0}")]
    Status(StatusCode),
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Unexpected feed contents: {0}")]
    Unexpected(String),
    #[error("No game found for the {0}")]
    NoGame(TeamId),
}

/// The production source: the NBA's live scoreboard for game state, and the schedule feed for
/// upcoming games
#[derive(Debug)]
pub struct NbaScoreSource {
    live: LiveScoreboardClient,
    schedule: ScheduleClient,
}

impl NbaScoreSource {
    pub fn new(
        live_feed: &LiveFeed,
        schedule_feed: &ScheduleFeed,
        require_https: bool,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            live: LiveScoreboardClient::new(&live_feed.url, require_https, live_feed.timeout)?,
            schedule: ScheduleClient::new(
                &schedule_feed.url,
                Some(schedule_feed.api_key.as_str()).filter(|key| !key.is_empty()),
                schedule_feed.timezone,
                require_https,
                schedule_feed.timeout,
            )?,
        })
    }
}

impl ScoreSource for NbaScoreSource {
    fn fetch_live(&self, team: TeamId) -> impl Future<Output = Result<GameSnapshot, FetchError>> {
        let scoreboard = self.live.get_scoreboard();
        async move { live::find_team_game(&scoreboard.await?, team) }
    }

    fn fetch_next(
        &self,
        team: TeamId,
    ) -> impl Future<Output = Result<ScheduleEntry, FetchError>> {
        let games = self.schedule.get_upcoming_games(team);
        let timezone = self.schedule.timezone();
        async move {
            let games = games.await?;
            schedule::next_entry(&games, team, timezone, OffsetDateTime::now_utc())
        }
    }
}
