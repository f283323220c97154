//! Session clock implementation.
//!
//! The session clock is a monotonic-time state machine. It does not use
//! internal threads or timers - the host calls `tick(now)` from whatever
//! scheduler it has (frame callback, fixed interval, test harness).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -start-> Countdown -3s-> Running -last phase ends-> Finished -1.5s-> Idle
//!                  |               |                          |
//!                  +----stop-------+----------stop------------+--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = SessionClock::new(build_schedule(&config));
//! let mut events = Vec::new();
//! clock.start(source.now(), &mut events);
//! while clock.needs_tick() {
//!     clock.tick(source.now(), &mut events);
//! }
//! ```
//!
//! Phase deadlines chain off the previous deadline rather than the tick that
//! noticed the boundary, so late ticks never stretch a session. A tick that
//! arrives after several boundaries raises one `PhaseEntered` per boundary,
//! in order.

use serde::Serialize;
use std::time::Duration;

use super::schedule::{Phase, Schedule};
use crate::events::{Event, EventSink};

/// Length of the "get ready" countdown before the first phase.
pub const COUNTDOWN_SECONDS: u64 = 3;

/// How long the clock stays in `Finished` before returning to `Idle`.
pub const FINISH_HOLD: Duration = Duration::from_millis(1500);

pub const IDLE_LABEL: &str = "Tap to start";
pub const COUNTDOWN_LABEL: &str = "Get ready";
pub const FINISHED_LABEL: &str = "Done!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Idle,
    Countdown,
    Running,
    /// Last phase ended; waiting out [`FINISH_HOLD`].
    Finished,
}

/// Mutable bookkeeping of one session. All instants are host monotonic time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionState {
    pub mode: ClockMode,
    pub countdown_start: Duration,
    /// Last countdown value handed to the sink.
    pub countdown_shown: u64,
    pub session_start: Duration,
    pub phase_index: usize,
    pub phase_deadline: Duration,
    pub finished_at: Duration,
    /// High-water mark of reported progress.
    pub progress: f64,
}

/// Point-in-time view for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockSnapshot {
    pub mode: ClockMode,
    pub phase: Option<Phase>,
    pub label: String,
    /// Big digits: countdown value, seconds left in the phase, or the
    /// session total while idle.
    pub display_secs: u64,
    pub progress: f64,
}

/// Core session clock.
///
/// Owns its schedule and state; any number of clocks can run side by side.
#[derive(Debug, Clone)]
pub struct SessionClock {
    schedule: Schedule,
    state: SessionState,
}

impl SessionClock {
    /// Create an idle clock for `schedule`.
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            state: SessionState::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> ClockMode {
        self.state.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn phase_index(&self) -> usize {
        self.state.phase_index
    }

    pub fn phase_deadline(&self) -> Duration {
        self.state.phase_deadline
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        match self.state.mode {
            ClockMode::Running => self.schedule.phase(self.state.phase_index),
            _ => None,
        }
    }

    /// Whether the host should keep its tick callback registered.
    pub fn needs_tick(&self) -> bool {
        self.state.mode != ClockMode::Idle
    }

    /// Overall progress at `now`, 0.0 ..= 1.0.
    pub fn progress(&self, now: Duration) -> f64 {
        match self.state.mode {
            ClockMode::Idle | ClockMode::Countdown => 0.0,
            ClockMode::Running => self.running_fraction(now).max(self.state.progress),
            ClockMode::Finished => 1.0,
        }
    }

    pub fn snapshot(&self, now: Duration) -> ClockSnapshot {
        let (label, display_secs) = match self.state.mode {
            ClockMode::Idle => (IDLE_LABEL.to_string(), self.schedule.total_secs()),
            ClockMode::Countdown => (COUNTDOWN_LABEL.to_string(), self.countdown_display(now)),
            ClockMode::Running => {
                let label = self
                    .current_phase()
                    .map(|p| self.schedule.label(p))
                    .unwrap_or_default();
                let remaining = self.state.phase_deadline.saturating_sub(now);
                (label, ceil_secs(remaining))
            }
            ClockMode::Finished => (FINISHED_LABEL.to_string(), 0),
        };
        ClockSnapshot {
            mode: self.state.mode,
            phase: self.current_phase().copied(),
            label,
            display_secs,
            progress: self.progress(now),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the pre-session countdown. No-op unless idle with phases to run.
    pub fn start(&mut self, now: Duration, sink: &mut impl EventSink) {
        if self.state.mode != ClockMode::Idle {
            return;
        }
        if self.schedule.is_empty() {
            tracing::debug!("start ignored: schedule has no phases");
            return;
        }
        self.state = SessionState {
            mode: ClockMode::Countdown,
            countdown_start: now,
            countdown_shown: COUNTDOWN_SECONDS,
            ..SessionState::default()
        };
        tracing::debug!(phases = self.schedule.len(), "countdown started");
        sink.emit(Event::CountdownTick {
            seconds_remaining: COUNTDOWN_SECONDS,
        });
        sink.emit(Event::Progress { fraction: 0.0 });
    }

    /// Abandon whatever is in progress and go idle. Idempotent.
    pub fn stop(&mut self, sink: &mut impl EventSink) {
        if self.state.mode == ClockMode::Idle {
            return;
        }
        tracing::debug!(from = ?self.state.mode, "session reset");
        self.state = SessionState::default();
        sink.emit(Event::SessionReset);
    }

    /// The host went into the background. A running session is abandoned;
    /// the countdown and the finish hold carry on.
    pub fn host_hidden(&mut self, sink: &mut impl EventSink) {
        if self.state.mode == ClockMode::Running {
            tracing::debug!("host hidden, abandoning running session");
            self.stop(sink);
        }
    }

    /// Replace the schedule after a configuration change.
    pub fn install(&mut self, schedule: Schedule, sink: &mut impl EventSink) {
        self.stop(sink);
        self.schedule = schedule;
    }

    /// Advance to `now`, raising every event that became due.
    pub fn tick(&mut self, now: Duration, sink: &mut impl EventSink) {
        match self.state.mode {
            ClockMode::Idle => {}
            ClockMode::Countdown => self.tick_countdown(now, sink),
            ClockMode::Running => self.tick_running(now, sink),
            ClockMode::Finished => {
                if now.saturating_sub(self.state.finished_at) >= FINISH_HOLD {
                    self.stop(sink);
                }
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_countdown(&mut self, now: Duration, sink: &mut impl EventSink) {
        let elapsed = now.saturating_sub(self.state.countdown_start);
        if elapsed < countdown_length() {
            let shown = self.countdown_display(now);
            if shown != self.state.countdown_shown {
                self.state.countdown_shown = shown;
                sink.emit(Event::CountdownTick {
                    seconds_remaining: shown,
                });
            }
            return;
        }
        self.begin_session(now, sink);
    }

    fn begin_session(&mut self, now: Duration, sink: &mut impl EventSink) {
        let Some(first) = self.schedule.phase(0).copied() else {
            self.stop(sink);
            return;
        };
        self.state.mode = ClockMode::Running;
        self.state.session_start = now;
        self.state.phase_index = 0;
        self.state.phase_deadline = now + first.duration();
        self.state.progress = 0.0;
        tracing::debug!(total_secs = self.schedule.total_secs(), "session started");
        self.enter_phase(&first, sink);
        sink.emit(Event::Progress { fraction: 0.0 });
    }

    fn tick_running(&mut self, now: Duration, sink: &mut impl EventSink) {
        while now >= self.state.phase_deadline {
            self.state.phase_index += 1;
            match self.schedule.phase(self.state.phase_index).copied() {
                Some(next) => {
                    self.state.phase_deadline += next.duration();
                    self.enter_phase(&next, sink);
                }
                None => {
                    self.finish(now, sink);
                    return;
                }
            }
        }
        let fraction = self.running_fraction(now).max(self.state.progress);
        self.state.progress = fraction;
        sink.emit(Event::Progress { fraction });
    }

    fn enter_phase(&self, phase: &Phase, sink: &mut impl EventSink) {
        tracing::debug!(
            ordinal = phase.ordinal,
            kind = phase.kind.as_str(),
            set = phase.set_index,
            "phase entered"
        );
        sink.emit(Event::PhaseEntered {
            phase: *phase,
            label: self.schedule.label(phase),
        });
    }

    fn finish(&mut self, now: Duration, sink: &mut impl EventSink) {
        self.state.mode = ClockMode::Finished;
        self.state.finished_at = now;
        self.state.progress = 1.0;
        tracing::debug!("session finished");
        sink.emit(Event::Progress { fraction: 1.0 });
        sink.emit(Event::SessionFinished);
    }

    fn running_fraction(&self, now: Duration) -> f64 {
        let total = self.schedule.total();
        if total.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_sub(self.state.session_start);
        (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
    }

    fn countdown_display(&self, now: Duration) -> u64 {
        let elapsed = now.saturating_sub(self.state.countdown_start);
        ceil_secs(countdown_length().saturating_sub(elapsed)).max(1)
    }
}

fn countdown_length() -> Duration {
    Duration::from_secs(COUNTDOWN_SECONDS)
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::config::resolve;
    use crate::timer::schedule::{build_schedule, PhaseKind};

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn clock(work: f64, rest: f64, sets: f64) -> SessionClock {
        SessionClock::new(build_schedule(&resolve(work, rest, sets)))
    }

    fn entered(events: &[Event]) -> Vec<(PhaseKind, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::PhaseEntered { phase, .. } => Some((phase.kind, phase.set_index)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_enters_countdown() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        assert_eq!(c.mode(), ClockMode::Countdown);
        assert_eq!(
            events,
            vec![
                Event::CountdownTick { seconds_remaining: 3 },
                Event::Progress { fraction: 0.0 },
            ]
        );
    }

    #[test]
    fn start_is_ignored_while_active() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.start(secs(1.0), &mut events);
        assert_eq!(c.state().countdown_start, secs(0.0));
        assert_eq!(events.len(), 2);

        c.tick(secs(3.0), &mut events);
        events.clear();
        c.start(secs(4.0), &mut events);
        assert_eq!(c.mode(), ClockMode::Running);
        assert!(events.is_empty());
    }

    #[test]
    fn countdown_emits_each_second_once() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        events.clear();
        for t in [0.1, 0.5, 1.0, 1.2, 1.9, 2.0, 2.5, 2.99] {
            c.tick(secs(t), &mut events);
        }
        assert_eq!(
            events,
            vec![
                Event::CountdownTick { seconds_remaining: 2 },
                Event::CountdownTick { seconds_remaining: 1 },
            ]
        );
        assert_eq!(c.snapshot(secs(2.99)).display_secs, 1);
        assert_eq!(c.snapshot(secs(0.2)).display_secs, 3);
    }

    #[test]
    fn countdown_hands_over_to_first_phase() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        events.clear();
        c.tick(secs(3.0), &mut events);

        assert_eq!(c.mode(), ClockMode::Running);
        assert_eq!(c.phase_index(), 0);
        assert_eq!(c.phase_deadline(), secs(13.0));
        assert_eq!(entered(&events), vec![(PhaseKind::Work, 1)]);
    }

    #[test]
    fn one_boundary_one_event() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(3.0), &mut events);
        events.clear();

        c.tick(secs(13.1), &mut events);
        assert_eq!(entered(&events), vec![(PhaseKind::Rest, 1)]);
        assert_eq!(c.phase_index(), 1);
        assert_eq!(c.phase_deadline(), secs(23.0));
    }

    #[test]
    fn late_tick_crosses_every_boundary_in_order() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(3.0), &mut events);
        c.tick(secs(13.1), &mut events);
        events.clear();

        c.tick(secs(35.0), &mut events);
        assert_eq!(
            events,
            vec![
                Event::PhaseEntered {
                    phase: *c.schedule().phase(2).unwrap(),
                    label: "Work 2/2".into(),
                },
                Event::Progress { fraction: 1.0 },
                Event::SessionFinished,
            ]
        );
        assert_eq!(c.mode(), ClockMode::Finished);
    }

    #[test]
    fn late_countdown_tick_anchors_session_at_that_tick() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        events.clear();
        c.tick(secs(7.5), &mut events);
        assert_eq!(entered(&events), vec![(PhaseKind::Work, 1)]);
        assert_eq!(c.state().session_start, secs(7.5));
        assert_eq!(c.phase_deadline(), secs(17.5));
    }

    #[test]
    fn deadlines_do_not_drift_with_late_ticks() {
        let mut c = clock(10.0, 10.0, 3.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(3.0), &mut events);
        // Each boundary noticed 0.9 s late.
        c.tick(secs(13.9), &mut events);
        c.tick(secs(23.9), &mut events);
        assert_eq!(c.phase_index(), 2);
        assert_eq!(c.phase_deadline(), secs(33.0));
    }

    #[test]
    fn finish_hold_then_idle() {
        let mut c = clock(10.0, 10.0, 1.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(3.0), &mut events);
        c.tick(secs(13.0), &mut events);
        assert_eq!(c.mode(), ClockMode::Finished);
        assert_eq!(c.snapshot(secs(13.0)).label, FINISHED_LABEL);

        events.clear();
        c.start(secs(13.5), &mut events);
        assert_eq!(c.mode(), ClockMode::Finished);
        c.tick(secs(14.0), &mut events);
        assert!(events.is_empty());

        c.tick(secs(14.5), &mut events);
        assert_eq!(c.mode(), ClockMode::Idle);
        assert_eq!(events, vec![Event::SessionReset]);
        assert!(!c.needs_tick());
    }

    #[test]
    fn stop_returns_to_idle_and_is_idempotent() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(5.0), &mut events);
        events.clear();

        c.stop(&mut events);
        c.stop(&mut events);
        assert_eq!(c.mode(), ClockMode::Idle);
        assert_eq!(events, vec![Event::SessionReset]);

        events.clear();
        c.tick(secs(50.0), &mut events);
        assert!(events.is_empty());
        assert_eq!(c.mode(), ClockMode::Idle);
    }

    #[test]
    fn stop_during_countdown() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.stop(&mut events);
        assert_eq!(c.mode(), ClockMode::Idle);
        assert!(!c.needs_tick());
    }

    #[test]
    fn empty_schedule_cannot_start() {
        let mut c = SessionClock::new(Schedule::empty());
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        assert_eq!(c.mode(), ClockMode::Idle);
        assert!(events.is_empty());
        assert_eq!(c.progress(secs(1.0)), 0.0);
    }

    #[test]
    fn progress_is_monotonic_and_capped() {
        let mut c = clock(20.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        let mut t = 0.0;
        while c.needs_tick() && t < 200.0 {
            c.tick(secs(t), &mut events);
            t += 0.37;
        }
        let fractions: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                Event::Progress { fraction } => Some(*fraction),
                _ => None,
            })
            .collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(fractions.last(), Some(&1.0));
    }

    #[test]
    fn snapshot_while_running() {
        let mut c = clock(30.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(3.0), &mut events);
        let snap = c.snapshot(secs(10.5));
        assert_eq!(snap.mode, ClockMode::Running);
        assert_eq!(snap.label, "Work 1/2");
        assert_eq!(snap.display_secs, 23);
        assert!((snap.progress - 7.5 / 70.0).abs() < 1e-9);
    }

    #[test]
    fn idle_snapshot_shows_total() {
        let c = clock(30.0, 30.0, 3.0);
        let snap = c.snapshot(secs(0.0));
        assert_eq!(snap.label, IDLE_LABEL);
        assert_eq!(snap.display_secs, 150);
        assert!(snap.phase.is_none());
    }

    #[test]
    fn host_hidden_only_abandons_running() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.host_hidden(&mut events);
        assert_eq!(c.mode(), ClockMode::Countdown);

        c.tick(secs(3.0), &mut events);
        c.host_hidden(&mut events);
        assert_eq!(c.mode(), ClockMode::Idle);
        assert_eq!(events.last(), Some(&Event::SessionReset));
    }

    #[test]
    fn install_resets_active_session() {
        let mut c = clock(10.0, 10.0, 2.0);
        let mut events = Vec::new();
        c.start(secs(0.0), &mut events);
        c.tick(secs(4.0), &mut events);
        events.clear();

        c.install(build_schedule(&resolve(60.0, 60.0, 10.0)), &mut events);
        assert_eq!(c.mode(), ClockMode::Idle);
        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(c.schedule().len(), 19);
    }

    #[test]
    fn independent_clocks_do_not_interfere() {
        let mut a = clock(10.0, 10.0, 1.0);
        let mut b = clock(10.0, 10.0, 1.0);
        let mut events = Vec::new();
        a.start(secs(0.0), &mut events);
        assert_eq!(a.mode(), ClockMode::Countdown);
        assert_eq!(b.mode(), ClockMode::Idle);
        b.start(secs(1.0), &mut events);
        a.stop(&mut events);
        assert_eq!(b.mode(), ClockMode::Countdown);
    }
}
