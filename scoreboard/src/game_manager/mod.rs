use crate::clock_sync::ClockSynchronizer;
use log::*;
use scoreboard_common::{
    config::Timing,
    feeds::{FetchError, ScoreSource},
    game_snapshot::{DisplayFrame, GameSnapshot, GameStatus, ScheduleEntry, TimeFrame},
    teams::TeamId,
    time_codec,
};
use std::fmt::{Display, Formatter};
use tokio::time::Instant;

/// Consecutive live polls without the game before the engine says so at info level
const MISSING_GAME_POLLS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No live game is known, the next scheduled game is shown
    AwaitingSchedule,
    Live,
}

impl Display for EngineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingSchedule => write!(f, "Awaiting Schedule"),
            Self::Live => write!(f, "Live"),
        }
    }
}

/// Decides when to call the score source, feeds the clock synchronizer, and produces the frame
/// to display on every tick.
#[derive(Debug)]
pub struct GameStateMachine<S> {
    source: S,
    team: TeamId,
    timing: Timing,
    state: EngineState,
    sync: ClockSynchronizer,
    time_frame: Option<TimeFrame>,
    next_game: Option<ScheduleEntry>,
    last_poll: Instant,
    last_schedule_lookup: Option<Instant>,
    missing_polls: u32,
}

impl<S: ScoreSource> GameStateMachine<S> {
    /// Asks the source once whether `team` is playing, and starts in the matching state
    pub async fn bootstrap(source: S, team: TeamId, timing: Timing, now: Instant) -> Self {
        let mut engine = Self {
            source,
            team,
            sync: ClockSynchronizer::new(&timing, now),
            timing,
            state: EngineState::AwaitingSchedule,
            time_frame: None,
            next_game: None,
            last_poll: now,
            last_schedule_lookup: None,
            missing_polls: 0,
        };

        let result = engine.source.fetch_live(team).await;
        match result {
            Ok(snapshot) if snapshot.status == GameStatus::Live => engine.start_live(&snapshot),
            Ok(snapshot) => {
                info!("The {team} game is {}, waiting for the next game", snapshot.status);
                engine.lookup_schedule(now).await;
            }
            Err(e) => {
                info!("No live game found for the {team} at start up: {e}");
                engine.lookup_schedule(now).await;
            }
        }

        engine
    }

    /// Runs one iteration of the engine: polls the source if the current cadence allows it,
    /// advances the simulated clock, and returns the frame to display
    pub async fn tick(&mut self, now: Instant) -> DisplayFrame {
        if self.poll_due(now) {
            self.poll(now).await;
        }

        self.sync.advance(now);
        if let Some(seconds) = self.sync.current_display_seconds() {
            if let Some(frame) = self.time_frame.as_mut() {
                frame.clock_seconds = seconds;
            }
        }

        self.current_frame()
    }

    pub fn current_frame(&self) -> DisplayFrame {
        match (self.state, &self.time_frame, &self.next_game) {
            (EngineState::Live, Some(frame), _) => DisplayFrame::Live(frame.clone()),
            (_, _, Some(entry)) => DisplayFrame::NextGame {
                team: self.team,
                entry: entry.clone(),
            },
            (_, _, None) => DisplayFrame::NoGame { team: self.team },
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn sync(&self) -> &ClockSynchronizer {
        &self.sync
    }

    pub fn time_frame(&self) -> Option<&TimeFrame> {
        self.time_frame.as_ref()
    }

    pub fn next_game(&self) -> Option<&ScheduleEntry> {
        self.next_game.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    fn poll_interval(&self) -> std::time::Duration {
        match self.state {
            EngineState::Live => self.timing.live_poll_interval,
            EngineState::AwaitingSchedule => self.timing.idle_poll_interval,
        }
    }

    fn poll_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_poll) >= self.poll_interval()
    }

    async fn poll(&mut self, now: Instant) {
        self.last_poll = now;
        let result = self.source.fetch_live(self.team).await;

        match (self.state, result) {
            (EngineState::Live, Ok(snapshot)) if snapshot.status == GameStatus::Live => {
                self.apply_live(&snapshot);
            }
            (EngineState::Live, Ok(snapshot)) => {
                if let Some(frame) = self.time_frame.as_mut() {
                    frame.home_score = snapshot.home_score;
                    frame.away_score = snapshot.away_score;
                }
                info!(
                    "The {} game is {} ({} - {}), waiting for the next game",
                    self.team, snapshot.status, snapshot.home_score, snapshot.away_score
                );
                self.end_live(now).await;
            }
            (EngineState::AwaitingSchedule, Ok(snapshot))
                if snapshot.status == GameStatus::Live =>
            {
                self.start_live(&snapshot);
            }
            (EngineState::AwaitingSchedule, Ok(_) | Err(FetchError::NoGame(_))) => {
                if self.schedule_is_stale(now) {
                    self.lookup_schedule(now).await;
                }
            }
            (EngineState::Live, Err(FetchError::NoGame(_))) => {
                self.missing_polls += 1;
                if self.missing_polls == MISSING_GAME_POLLS {
                    info!(
                        "The {} game has been missing from the live feed for {} polls, \
                         holding the last frame",
                        self.team, self.missing_polls
                    );
                } else {
                    debug!(
                        "The {} game is missing from the live feed ({} polls)",
                        self.team, self.missing_polls
                    );
                }
            }
            (state, Err(e)) => {
                warn!("Poll of the live feed failed while {state}: {e}");
            }
        }
    }

    fn start_live(&mut self, snapshot: &GameSnapshot) {
        info!(
            "The {} game is live against the {}",
            self.team, snapshot.opponent
        );
        self.state = EngineState::Live;
        self.time_frame = None;
        self.sync.enter_live(self.timing.display_delay);
        self.apply_live(snapshot);
    }

    async fn end_live(&mut self, now: Instant) {
        self.state = EngineState::AwaitingSchedule;
        self.missing_polls = 0;
        self.sync.reset();
        self.lookup_schedule(now).await;
    }

    fn apply_live(&mut self, snapshot: &GameSnapshot) {
        self.missing_polls = 0;
        if self
            .time_frame
            .as_ref()
            .is_some_and(|frame| frame.period != snapshot.period)
        {
            debug!("Period changed to {}, reseeding the clock", snapshot.period);
            self.sync.reset();
        }

        self.sync
            .on_authoritative_sample(time_codec::parse_clock(&snapshot.clock_text));

        let clock_seconds = self
            .sync
            .current_display_seconds()
            .or_else(|| self.time_frame.as_ref().map(|frame| frame.clock_seconds))
            .unwrap_or(0);

        let frame = TimeFrame::from_snapshot(self.team, snapshot, clock_seconds);
        trace!("Updated frame: {frame:?}");
        self.time_frame = Some(frame);
    }

    fn schedule_is_stale(&self, now: Instant) -> bool {
        self.next_game.is_none()
            || self.last_schedule_lookup.is_none_or(|last| {
                now.saturating_duration_since(last) >= self.timing.schedule_refresh_interval
            })
    }

    async fn lookup_schedule(&mut self, now: Instant) {
        self.last_schedule_lookup = Some(now);
        let result = self.source.fetch_next(self.team).await;

        match result {
            Ok(entry) => {
                if self.next_game.as_ref() != Some(&entry) {
                    info!(
                        "Next {} game: {} at {} against the {}",
                        self.team, entry.date, entry.start_time, entry.opponent_team
                    );
                }
                self.next_game = Some(entry);
            }
            Err(FetchError::NoGame(_)) => {
                info!("No upcoming game found for the {}", self.team);
            }
            Err(e) => warn!("Schedule lookup failed: {e}"),
        }
    }
}
