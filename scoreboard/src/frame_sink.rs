use log::*;
use scoreboard_common::{
    game_snapshot::{DisplayFrame, TimeFrame},
    teams::TeamId,
};
use serde::Serialize;
use std::io::Write;

/// Consumes the frames produced by the engine. Rendering the same frame twice in a row must have
/// no further effect.
pub trait FrameSink {
    fn render(&mut self, frame: &DisplayFrame);
}

pub fn period_label(period: u8) -> String {
    match period {
        0 => String::new(),
        1..=4 => format!("Q{period}"),
        5 => "OT".to_string(),
        p => format!("{}OT", p - 4),
    }
}

/// A one line, human readable rendition of `frame`
pub fn describe(frame: &DisplayFrame) -> String {
    let team = frame.team().tricode();
    match frame {
        DisplayFrame::Live(frame) => {
            let opponent = frame.opponent.map_or("???", TeamId::tricode);
            format!(
                "{team} {} - {} {opponent}  {} {}",
                frame.home_score,
                frame.away_score,
                period_label(frame.period),
                frame.clock_text()
            )
        }
        DisplayFrame::NextGame { entry, .. } => format!(
            "{team} next game: vs {} on {} at {}",
            entry.opponent_team.tricode(),
            entry.date,
            entry.start_time
        ),
        DisplayFrame::NoGame { .. } => format!("{team} no upcoming game"),
    }
}

#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<DisplayFrame>,
}

impl LogSink {
    pub fn new() -> Self {
        Default::default()
    }
}

impl FrameSink for LogSink {
    fn render(&mut self, frame: &DisplayFrame) {
        if self.last.as_ref() == Some(frame) {
            return;
        }
        info!("{}", describe(frame));
        self.last = Some(frame.clone());
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonFrame<'a> {
    Live {
        team: TeamId,
        home_score: u16,
        away_score: u16,
        opponent: Option<TeamId>,
        period: u8,
        clock_seconds: u32,
        clock: String,
    },
    NextGame {
        team: TeamId,
        opponent: TeamId,
        date: &'a str,
        start_time: &'a str,
    },
    NoGame {
        team: TeamId,
    },
}

impl JsonFrame<'_> {
    fn live(frame: &TimeFrame) -> Self {
        Self::Live {
            team: frame.team,
            home_score: frame.home_score,
            away_score: frame.away_score,
            opponent: frame.opponent,
            period: frame.period,
            clock_seconds: frame.clock_seconds,
            clock: frame.clock_text(),
        }
    }
}

impl<'a> From<&'a DisplayFrame> for JsonFrame<'a> {
    fn from(frame: &'a DisplayFrame) -> Self {
        match frame {
            DisplayFrame::Live(frame) => Self::live(frame),
            DisplayFrame::NextGame { team, entry } => Self::NextGame {
                team: *team,
                opponent: entry.opponent_team,
                date: &entry.date,
                start_time: &entry.start_time,
            },
            DisplayFrame::NoGame { team } => Self::NoGame { team: *team },
        }
    }
}

/// Writes each new frame as a line of JSON
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    writer: W,
    last: Option<DisplayFrame>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last: None }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_frame(&mut self, frame: &DisplayFrame) -> Result<(), std::io::Error> {
        serde_json::to_writer(&mut self.writer, &JsonFrame::from(frame))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> FrameSink for JsonSink<W> {
    fn render(&mut self, frame: &DisplayFrame) {
        if self.last.as_ref() == Some(frame) {
            return;
        }
        if let Err(e) = self.write_frame(frame) {
            warn!("Failed to write frame: {e}");
        }
        self.last = Some(frame.clone());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use scoreboard_common::game_snapshot::ScheduleEntry;
    use serde_json::{Value, json};

    fn live_frame() -> DisplayFrame {
        DisplayFrame::Live(TimeFrame {
            team: TeamId::Celtics,
            home_score: 54,
            away_score: 50,
            opponent: Some(TeamId::Knicks),
            clock_seconds: 432,
            period: 3,
        })
    }

    fn next_frame() -> DisplayFrame {
        DisplayFrame::NextGame {
            team: TeamId::Celtics,
            entry: ScheduleEntry {
                date: "2025-01-07".to_string(),
                start_time: "7:30 PM".to_string(),
                opponent_team: TeamId::Suns,
            },
        }
    }

    fn lines(sink: JsonSink<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_period_label() {
        assert_eq!(period_label(0), "");
        assert_eq!(period_label(1), "Q1");
        assert_eq!(period_label(4), "Q4");
        assert_eq!(period_label(5), "OT");
        assert_eq!(period_label(7), "3OT");
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&live_frame()), "BOS 54 - 50 NYK  Q3 07:12");
        assert_eq!(
            describe(&next_frame()),
            "BOS next game: vs PHX on 2025-01-07 at 7:30 PM"
        );
        assert_eq!(
            describe(&DisplayFrame::NoGame {
                team: TeamId::Jazz
            }),
            "UTA no upcoming game"
        );
    }

    #[test]
    fn test_json_sink() {
        let mut sink = JsonSink::new(Vec::new());
        sink.render(&live_frame());
        sink.render(&live_frame());
        sink.render(&next_frame());
        sink.render(&DisplayFrame::NoGame {
            team: TeamId::Celtics,
        });

        assert_eq!(
            lines(sink),
            vec![
                json!({
                    "kind": "live",
                    "team": "BOS",
                    "home_score": 54,
                    "away_score": 50,
                    "opponent": "NYK",
                    "period": 3,
                    "clock_seconds": 432,
                    "clock": "07:12",
                }),
                json!({
                    "kind": "next_game",
                    "team": "BOS",
                    "opponent": "PHX",
                    "date": "2025-01-07",
                    "start_time": "7:30 PM",
                }),
                json!({
                    "kind": "no_game",
                    "team": "BOS",
                }),
            ]
        );
    }

    #[test]
    fn test_json_sink_unknown_opponent() {
        let mut sink = JsonSink::new(Vec::new());
        let DisplayFrame::Live(frame) = live_frame() else {
            unreachable!()
        };
        sink.render(&DisplayFrame::Live(TimeFrame {
            opponent: None,
            ..frame
        }));
        assert_eq!(lines(sink)[0]["opponent"], Value::Null);
    }

    #[test]
    fn test_log_sink_dedups() {
        let mut sink = LogSink::new();
        sink.render(&live_frame());
        assert_eq!(sink.last, Some(live_frame()));
        sink.render(&next_frame());
        assert_eq!(sink.last, Some(next_frame()));
    }
}
