use super::FetchError;
use crate::{
    game_snapshot::{GameSnapshot, GameStatus},
    teams::TeamId,
};
use log::{debug, warn};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::{future::Future, time::Duration};

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ScoreboardResponse {
    pub scoreboard: Scoreboard,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    #[serde(default)]
    pub games: Vec<LiveGame>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveGame {
    pub game_status: u8,
    #[serde(default)]
    pub game_status_text: String,
    #[serde(default)]
    pub game_clock: String,
    #[serde(default, deserialize_with = "deser_with_null_to_default")]
    pub period: u8,
    pub home_team: LiveTeam,
    pub away_team: LiveTeam,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTeam {
    pub team_name: String,
    #[serde(default)]
    pub team_tricode: String,
    #[serde(default, deserialize_with = "deser_with_null_to_default")]
    pub score: u16,
}

impl LiveTeam {
    fn is(&self, team: TeamId) -> bool {
        team.tricode().eq_ignore_ascii_case(&self.team_tricode)
            || TeamId::from_name(&self.team_name) == Some(team)
    }
}

// Deserialize normally, but use the value's default if `null` is found
fn deser_with_null_to_default<'de, D, T: Deserialize<'de> + Default>(
    deserializer: D,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(|val| val.unwrap_or_default())
}

#[derive(Debug)]
pub struct LiveScoreboardClient {
    url: String,
    client: Client,
}

impl LiveScoreboardClient {
    pub fn new(url: &str, require_https: bool, timeout: Duration) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .https_only(require_https)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn get_scoreboard(
        &self,
    ) -> impl Future<Output = Result<Scoreboard, FetchError>> + use<> {
        let request = self.client.get(&self.url).send();

        async move {
            let response = request.await?;

            if response.status() == StatusCode::OK {
                let body = response.text().await?;
                let parsed: ScoreboardResponse = serde_json::from_str(&body)?;
                debug!(
                    "Live scoreboard lists {} games",
                    parsed.scoreboard.games.len()
                );
                Ok(parsed.scoreboard)
            } else {
                warn!("Live scoreboard request failed, response: {response:?}");
                Err(FetchError::Status(response.status()))
            }
        }
    }
}

/// Finds `team`'s game on the scoreboard, reported from `team`'s side: `home_score` is always
/// `team`'s score, whether they are home or away
pub fn find_team_game(scoreboard: &Scoreboard, team: TeamId) -> Result<GameSnapshot, FetchError> {
    let (game, us, them) = scoreboard
        .games
        .iter()
        .find_map(|game| {
            if game.home_team.is(team) {
                Some((game, &game.home_team, &game.away_team))
            } else if game.away_team.is(team) {
                Some((game, &game.away_team, &game.home_team))
            } else {
                None
            }
        })
        .ok_or(FetchError::NoGame(team))?;

    let status = GameStatus::from_code(game.game_status).ok_or_else(|| {
        FetchError::Unexpected(format!("unknown game status {}", game.game_status))
    })?;

    Ok(GameSnapshot {
        home_score: us.score,
        away_score: them.score,
        opponent: them.team_name.clone(),
        clock_text: game.game_clock.clone(),
        status_text: game.game_status_text.clone(),
        status,
        period: game.period,
    })
}
