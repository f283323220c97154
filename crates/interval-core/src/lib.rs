//! # Interval Timer Core Library
//!
//! This library provides the core logic for an interval-training timer: a
//! work/rest/sets configuration is turned into a fixed phase schedule, and a
//! session clock counts down through it. Hosts (the CLI, a desktop shell, a
//! test harness) drive the clock by calling `tick(now)` with monotonic time
//! and render the events it raises.
//!
//! ## Architecture
//!
//! - **Configuration resolver**: clamps raw numbers onto the allowed grid
//! - **Phase sequencer**: builds the alternating work/rest schedule
//! - **Session clock**: Idle / Countdown / Running / Finished state machine,
//!   drift-free under late or irregular ticks
//! - **Events**: the boundary between the clock and its renderers
//! - **Cues**: bell and vibration descriptors for each event
//! - **Storage**: versioned TOML store for the committed configuration
//!
//! ## Key Components
//!
//! - [`SessionClock`]: Core timer state machine
//! - [`Schedule`]: Ordered phases and total duration
//! - [`Event`] / [`EventSink`]: What the clock reports and where it goes
//! - [`Config`]: Persisted configuration

pub mod cue;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use cue::{BellPreset, Cue};
pub use error::{ConfigError, CoreError};
pub use events::{Event, EventSink, FnSink};
pub use storage::Config;
pub use timer::{
    build_schedule, resolve, ClockMode, ClockSnapshot, Configuration, InstantSource,
    ManualSource, MonotonicSource, Phase, PhaseKind, Schedule, SessionClock,
};
