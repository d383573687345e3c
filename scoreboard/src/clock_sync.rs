use log::*;
use scoreboard_common::config::Timing;
use tokio::time::{Duration, Instant};

/// The locally simulated game clock.
///
/// The displayed value counts down once per tick period toward the last clock value reported by
/// the feed, and holds there until a newer report arrives. It never counts up and never drops more
/// than one second per call to [`advance`](Self::advance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockSynchronizer {
    target: Option<u32>,
    display: Option<u32>,
    next_tick_deadline: Instant,
    delay: u32,
    tick_period: Duration,
    stall_threshold: Duration,
    reanchor_offset: Duration,
}

impl ClockSynchronizer {
    pub fn new(timing: &Timing, now: Instant) -> Self {
        Self {
            target: None,
            display: None,
            next_tick_deadline: now + timing.tick_period,
            delay: timing.display_delay,
            tick_period: timing.tick_period,
            stall_threshold: timing.stall_threshold,
            reanchor_offset: timing.reanchor_offset,
        }
    }

    /// Starts a new live session. The first sample received afterwards is shown `initial_delay`
    /// seconds behind the feed.
    pub fn enter_live(&mut self, initial_delay: u32) {
        self.reset();
        self.delay = initial_delay;
        debug!("Clock entering live mode with a {initial_delay}s delay");
    }

    /// Records a clock value reported by the feed. `None` (an unparseable clock) changes nothing.
    pub fn on_authoritative_sample(&mut self, seconds: Option<u32>) {
        let Some(seconds) = seconds else {
            trace!("No usable clock sample, holding at {:?}", self.display);
            return;
        };

        self.target = Some(seconds);
        match self.display {
            None => {
                let seeded = seconds.saturating_add(self.delay);
                debug!("Seeding clock at {seeded}s from a sample of {seconds}s");
                self.display = Some(seeded);
            }
            Some(display) if display < seconds => {
                debug!("Feed clock ({seconds}s) is above the displayed clock ({display}s), holding");
            }
            Some(_) => {}
        }
    }

    /// Runs the ticker. Returns `true` if the displayed clock was decremented.
    pub fn advance(&mut self, now: Instant) -> bool {
        if now < self.next_tick_deadline {
            return false;
        }

        let lag = now - self.next_tick_deadline;
        if lag > self.stall_threshold {
            debug!("Clock tick is {lag:?} late, re-anchoring");
            self.next_tick_deadline = now + self.reanchor_offset;
        } else {
            self.next_tick_deadline += self.tick_period;
        }

        match (self.display, self.target) {
            (Some(display), Some(target)) if display > target => {
                self.display = Some(display - 1);
                trace!("Clock ticked to {}s (target {target}s)", display - 1);
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.target = None;
        self.display = None;
    }

    pub fn current_display_seconds(&self) -> Option<u32> {
        self.display
    }

    pub fn target_seconds(&self) -> Option<u32> {
        self.target
    }

    pub fn next_tick_deadline(&self) -> Instant {
        self.next_tick_deadline
    }

    /// `true` when the displayed clock has caught down to the feed
    pub fn is_holding(&self) -> bool {
        match (self.display, self.target) {
            (Some(display), Some(target)) => display <= target,
            _ => false,
        }
    }
}
