use super::FetchError;
use crate::{
    game_snapshot::ScheduleEntry,
    teams::TeamId,
    time_codec::{format_time_of_day, parse_time_of_day},
};
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder, StatusCode, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};
use time::{Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct GamesResponse {
    pub data: Vec<ScheduledGame>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ScheduledGame {
    /// `YYYY-MM-DD`, in US Eastern time
    pub date: String,
    /// RFC 3339 start time in UTC, missing when the league hasn't set a time yet
    pub datetime: Option<String>,
    /// `Final`, a start time, or the in-game status
    #[serde(default)]
    pub status: String,
    pub home_team: ScheduleTeam,
    pub visitor_team: ScheduleTeam,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ScheduleTeam {
    pub id: u32,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub full_name: String,
}

impl ScheduleTeam {
    fn is(&self, team: TeamId) -> bool {
        self.id == team.schedule_id()
    }

    fn team_id(&self) -> Option<TeamId> {
        TeamId::from_schedule_id(self.id).or_else(|| TeamId::from_tricode(&self.abbreviation))
    }
}

impl ScheduledGame {
    fn opponent_of(&self, team: TeamId) -> Option<&ScheduleTeam> {
        if self.home_team.is(team) {
            Some(&self.visitor_team)
        } else if self.visitor_team.is(team) {
            Some(&self.home_team)
        } else {
            None
        }
    }

    fn is_final(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("final")
    }

    fn start(&self) -> Option<OffsetDateTime> {
        let datetime = self.datetime.as_deref()?;
        OffsetDateTime::parse(datetime, &Rfc3339)
            .map_err(|e| debug!("Ignoring start time {datetime:?}: {e}"))
            .ok()
    }

    /// A game with a start time before `now` has already begun, whatever its status says
    fn has_started(&self, now: OffsetDateTime) -> bool {
        self.start().is_some_and(|start| start <= now)
    }
}

#[derive(Debug)]
pub struct ScheduleClient {
    base_url: String,
    api_key: Option<String>,
    timezone: UtcOffset,
    client: Client,
}

impl ScheduleClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timezone: UtcOffset,
        require_https: bool,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .https_only(require_https)
            .timeout(timeout)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            api_key: api_key.map(|s| s.to_string()),
            timezone,
            client,
        })
    }

    pub fn timezone(&self) -> UtcOffset {
        self.timezone
    }

    /// Requests every game for `team` from today (in the configured timezone) onward
    pub fn get_upcoming_games(
        &self,
        team: TeamId,
    ) -> impl Future<Output = Result<Vec<ScheduledGame>, FetchError>> + use<> {
        let url = format!("{}/v1/games", self.base_url);
        let today = OffsetDateTime::now_utc().to_offset(self.timezone).date();

        let mut request = self.client.get(&url).query(&[
            ("team_ids[]", team.schedule_id().to_string()),
            ("start_date", format_date(today)),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }
        let request = request.send();

        async move {
            let response = request.await?;

            if response.status() == StatusCode::OK {
                let body = response.text().await?;
                let parsed: GamesResponse = serde_json::from_str(&body)?;
                info!("Schedule feed returned {} games for the {team}", parsed.data.len());
                Ok(parsed.data)
            } else {
                warn!("Schedule request failed, response: {response:?}");
                Err(FetchError::Status(response.status()))
            }
        }
    }
}

/// Picks the earliest game for `team` that is neither finished nor already started at `now`, with
/// its date and start time shown in `timezone`
pub fn next_entry(
    games: &[ScheduledGame],
    team: TeamId,
    timezone: UtcOffset,
    now: OffsetDateTime,
) -> Result<ScheduleEntry, FetchError> {
    let (game, opponent) = games
        .iter()
        .filter(|game| !game.is_final() && !game.has_started(now))
        .filter_map(|game| game.opponent_of(team).map(|opponent| (game, opponent)))
        .min_by(|(a, _), (b, _)| {
            (a.date.as_str(), a.datetime.as_deref()).cmp(&(b.date.as_str(), b.datetime.as_deref()))
        })
        .ok_or(FetchError::NoGame(team))?;

    let opponent_team = opponent.team_id().ok_or_else(|| {
        FetchError::Unexpected(format!(
            "unknown opponent {} ({})",
            opponent.full_name, opponent.id
        ))
    })?;

    let (date, start_time) = match game.start() {
        Some(start) => {
            let start = start.to_offset(timezone);
            let minutes = u16::from(start.hour()) * 60 + u16::from(start.minute());
            (format_date(start.date()), format_time_of_day(minutes))
        }
        // The status text holds the start time (in the league's zone) before a game begins
        None => (
            game.date.chars().take(10).collect(),
            parse_time_of_day(&game.status)
                .map(format_time_of_day)
                .unwrap_or_else(|| "TBD".to_string()),
        ),
    };

    Ok(ScheduleEntry {
        date,
        start_time,
        opponent_team,
    })
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;
    use time::macros::{datetime, offset};

    const NOW: OffsetDateTime = datetime!(2025-01-06 12:00 UTC);

    const GAMES_JSON: &str = indoc!(
        r#"{
            "data": [
                {
                    "id": 3,
                    "date": "2025-01-09",
                    "datetime": "2025-01-10T00:30:00.000Z",
                    "status": "2025-01-10T00:30:00Z",
                    "home_team": { "id": 2, "abbreviation": "BOS", "full_name": "Boston Celtics" },
                    "visitor_team": { "id": 20, "abbreviation": "NYK", "full_name": "New York Knicks" }
                },
                {
                    "id": 2,
                    "date": "2025-01-07",
                    "datetime": "2025-01-07T23:00:00.000Z",
                    "status": "2025-01-07T23:00:00Z",
                    "home_team": { "id": 24, "abbreviation": "PHX", "full_name": "Phoenix Suns" },
                    "visitor_team": { "id": 2, "abbreviation": "BOS", "full_name": "Boston Celtics" }
                },
                {
                    "id": 1,
                    "date": "2025-01-05",
                    "datetime": "2025-01-05T20:00:00.000Z",
                    "status": "Final",
                    "home_team": { "id": 2, "abbreviation": "BOS", "full_name": "Boston Celtics" },
                    "visitor_team": { "id": 16, "abbreviation": "MIA", "full_name": "Miami Heat" }
                }
            ],
            "meta": { "per_page": 25 }
        }"#
    );

    fn games() -> Vec<ScheduledGame> {
        serde_json::from_str::<GamesResponse>(GAMES_JSON)
            .unwrap()
            .data
    }

    #[test]
    fn test_next_entry_skips_finished_games() {
        assert_eq!(
            next_entry(&games(), TeamId::Celtics, offset!(-5), NOW).unwrap(),
            ScheduleEntry {
                date: "2025-01-07".to_string(),
                start_time: "6:00 PM".to_string(),
                opponent_team: TeamId::Suns,
            }
        );
    }

    #[test]
    fn test_next_entry_converts_date_to_local() {
        let games: Vec<_> = games().into_iter().filter(|g| g.date == "2025-01-09").collect();
        assert_eq!(
            next_entry(&games, TeamId::Celtics, offset!(-5), NOW).unwrap(),
            ScheduleEntry {
                date: "2025-01-09".to_string(),
                start_time: "7:30 PM".to_string(),
                opponent_team: TeamId::Knicks,
            }
        );
        assert_eq!(
            next_entry(&games, TeamId::Knicks, UtcOffset::UTC, NOW).unwrap(),
            ScheduleEntry {
                date: "2025-01-10".to_string(),
                start_time: "12:30 AM".to_string(),
                opponent_team: TeamId::Celtics,
            }
        );
    }

    #[test]
    fn test_next_entry_without_datetime() {
        let mut games = games();
        games[1].datetime = None;
        games[1].status = "6:00 pm ET".to_string();
        let entry = next_entry(&games, TeamId::Celtics, offset!(-5), NOW).unwrap();
        assert_eq!(entry.date, "2025-01-07");
        assert_eq!(entry.start_time, "6:00 PM");

        games[1].status = String::new();
        let entry = next_entry(&games, TeamId::Celtics, offset!(-5), NOW).unwrap();
        assert_eq!(entry.start_time, "TBD");
    }

    #[test]
    fn test_next_entry_skips_started_games() {
        // Tipped off ten minutes ago, but the status hasn't caught up yet
        let mut games = games();
        games[1].status = "1st Qtr".to_string();
        let now = datetime!(2025-01-07 23:10 UTC);
        assert_eq!(
            next_entry(&games, TeamId::Celtics, offset!(-5), now).unwrap(),
            ScheduleEntry {
                date: "2025-01-09".to_string(),
                start_time: "7:30 PM".to_string(),
                opponent_team: TeamId::Knicks,
            }
        );

        // Exactly at the start time counts as started
        let now = datetime!(2025-01-07 23:00 UTC);
        let entry = next_entry(&games, TeamId::Celtics, offset!(-5), now).unwrap();
        assert_eq!(entry.opponent_team, TeamId::Knicks);

        // Games without a start time are kept
        games[1].datetime = None;
        let entry = next_entry(&games, TeamId::Celtics, offset!(-5), now).unwrap();
        assert_eq!(entry.opponent_team, TeamId::Suns);

        let now = datetime!(2025-01-10 01:00 UTC);
        assert!(matches!(
            next_entry(&self::games()[..1], TeamId::Celtics, offset!(-5), now),
            Err(FetchError::NoGame(TeamId::Celtics))
        ));
    }

    #[test]
    fn test_next_entry_no_game() {
        assert!(matches!(
            next_entry(&[], TeamId::Celtics, UtcOffset::UTC, NOW),
            Err(FetchError::NoGame(TeamId::Celtics))
        ));
        assert!(matches!(
            next_entry(&games(), TeamId::Heat, UtcOffset::UTC, NOW),
            Err(FetchError::NoGame(TeamId::Heat))
        ));
    }

    #[test]
    fn test_next_entry_unknown_opponent() {
        let mut games = games();
        games[1].home_team = ScheduleTeam {
            id: 41,
            abbreviation: "WLD".to_string(),
            full_name: "Team World".to_string(),
        };
        assert!(matches!(
            next_entry(&games, TeamId::Celtics, UtcOffset::UTC, NOW),
            Err(FetchError::Unexpected(_))
        ));
    }
}
