mod clock;
mod config;
mod engine;
mod schedule;

pub use clock::{InstantSource, ManualSource, MonotonicSource};
pub use config::{
    resolve, Configuration, FieldBounds, REST_BOUNDS, SET_BOUNDS, WORK_BOUNDS,
};
pub use engine::{
    ClockMode, ClockSnapshot, SessionClock, SessionState, COUNTDOWN_LABEL, COUNTDOWN_SECONDS,
    FINISHED_LABEL, FINISH_HOLD, IDLE_LABEL,
};
pub use schedule::{build_schedule, Phase, PhaseKind, Schedule};
