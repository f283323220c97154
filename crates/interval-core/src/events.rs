use serde::Serialize;

use crate::timer::Phase;

/// Everything the session clock tells the outside world.
///
/// Raised synchronously from `start`, `tick`, `stop` and friends. Renderers
/// (display, bells, vibration) subscribe through an [`EventSink`]; the clock
/// knows nothing about them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Pre-session countdown display value changed.
    CountdownTick { seconds_remaining: u64 },
    /// A phase began. Raised once per phase, in schedule order.
    PhaseEntered { phase: Phase, label: String },
    /// Overall session progress, 0.0 ..= 1.0.
    Progress { fraction: f64 },
    /// The last phase ran out.
    SessionFinished,
    /// The clock went back to idle (stop, abandon, or end of finish hold).
    SessionReset,
}

/// Receiver for clock events.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Adapter turning any closure into an [`EventSink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(Event)> EventSink for FnSink<F> {
    fn emit(&mut self, event: Event) {
        (self.0)(event)
    }
}
