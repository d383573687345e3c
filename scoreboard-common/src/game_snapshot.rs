use crate::{teams::TeamId, time_codec};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
}

impl GameStatus {
    /// Maps the live feed's numeric `gameStatus`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Scheduled),
            2 => Some(Self::Live),
            3 => Some(Self::Final),
            _ => None,
        }
    }
}

impl core::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            GameStatus::Scheduled => write!(f, "Scheduled"),
            GameStatus::Live => write!(f, "Live"),
            GameStatus::Final => write!(f, "Final"),
        }
    }
}

/// The result of one poll of the live feed, already normalized so that the requested team's
/// score is `home_score`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GameSnapshot {
    pub home_score: u16,
    pub away_score: u16,
    pub opponent: String,
    pub clock_text: String,
    pub status_text: String,
    pub status: GameStatus,
    pub period: u8,
}

/// What is shown on the panel while a game is live
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct TimeFrame {
    pub team: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    pub opponent: Option<TeamId>,
    pub clock_seconds: u32,
    pub period: u8,
}

impl TimeFrame {
    pub fn from_snapshot(team: TeamId, snapshot: &GameSnapshot, clock_seconds: u32) -> Self {
        Self {
            team,
            home_score: snapshot.home_score,
            away_score: snapshot.away_score,
            opponent: TeamId::from_name(&snapshot.opponent),
            clock_seconds,
            period: snapshot.period,
        }
    }

    pub fn clock_text(&self) -> String {
        time_codec::format_clock(self.clock_seconds.into())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// `YYYY-MM-DD` in the configured timezone
    pub date: String,
    /// Local wall clock start, e.g. `7:30 PM`
    pub start_time: String,
    pub opponent_team: TeamId,
}

/// Everything a frame sink needs to draw one refresh of the panel
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum DisplayFrame {
    Live(TimeFrame),
    NextGame { team: TeamId, entry: ScheduleEntry },
    NoGame { team: TeamId },
}

impl DisplayFrame {
    pub fn team(&self) -> TeamId {
        match self {
            Self::Live(frame) => frame.team,
            Self::NextGame { team, .. } | Self::NoGame { team } => *team,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            home_score: 54,
            away_score: 50,
            opponent: "Knicks".to_string(),
            clock_text: "PT07M12.00S".to_string(),
            status_text: "Q3 7:12".to_string(),
            status: GameStatus::Live,
            period: 3,
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GameStatus::from_code(0), None);
        assert_eq!(GameStatus::from_code(1), Some(GameStatus::Scheduled));
        assert_eq!(GameStatus::from_code(2), Some(GameStatus::Live));
        assert_eq!(GameStatus::from_code(3), Some(GameStatus::Final));
        assert_eq!(GameStatus::from_code(4), None);
    }

    #[test]
    fn test_frame_from_snapshot() {
        let frame = TimeFrame::from_snapshot(TeamId::Celtics, &snapshot(), 462);
        assert_eq!(
            frame,
            TimeFrame {
                team: TeamId::Celtics,
                home_score: 54,
                away_score: 50,
                opponent: Some(TeamId::Knicks),
                clock_seconds: 462,
                period: 3,
            }
        );
        assert_eq!(frame.clock_text(), "07:42");
    }

    #[test]
    fn test_display_frame_team() {
        let entry = ScheduleEntry {
            date: "2025-01-07".to_string(),
            start_time: "7:30 PM".to_string(),
            opponent_team: TeamId::Suns,
        };
        let live = TimeFrame::from_snapshot(TeamId::Knicks, &snapshot(), 0);
        assert_eq!(DisplayFrame::Live(live).team(), TeamId::Knicks);
        assert_eq!(
            DisplayFrame::NextGame {
                team: TeamId::Celtics,
                entry
            }
            .team(),
            TeamId::Celtics
        );
        assert_eq!(DisplayFrame::NoGame { team: TeamId::Jazz }.team(), TeamId::Jazz);
    }

    #[test]
    fn test_frame_unknown_opponent() {
        let snapshot = GameSnapshot {
            opponent: "Team World".to_string(),
            ..snapshot()
        };
        let frame = TimeFrame::from_snapshot(TeamId::Celtics, &snapshot, 0);
        assert_eq!(frame.opponent, None);
        assert_eq!(frame.clock_text(), "00:00");
    }
}
