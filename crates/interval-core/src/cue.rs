//! Renderer-neutral cue descriptors.
//!
//! Maps clock events to "what should the user hear and feel". The tables are
//! data only: a desktop shell synthesizes the bells, a terminal rings its
//! bell, a phone vibrates. The session clock never looks at this module.

use serde::Serialize;

use crate::events::Event;
use crate::timer::{PhaseKind, COUNTDOWN_SECONDS};

/// Parameters of a struck-bell tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BellPreset {
    pub base_frequency_hz: f64,
    pub strikes: u32,
    /// Seconds between consecutive strikes.
    pub strike_interval: f64,
    pub decay: f64,
    pub level: f64,
}

pub const WORK_BELL: BellPreset = BellPreset {
    base_frequency_hz: 987.77,
    strikes: 2,
    strike_interval: 0.12,
    decay: 1.4,
    level: 0.85,
};

pub const REST_BELL: BellPreset = BellPreset {
    base_frequency_hz: 659.25,
    strikes: 1,
    strike_interval: 0.0,
    decay: 1.6,
    level: 0.7,
};

pub const FINISH_BELL: BellPreset = BellPreset {
    base_frequency_hz: 1318.5,
    strikes: 3,
    strike_interval: 0.14,
    decay: 1.7,
    level: 0.95,
};

/// Vibration patterns, alternating on/off milliseconds.
pub const COUNTDOWN_VIBRATION: &[u32] = &[30];
pub const SESSION_START_VIBRATION: &[u32] = &[60, 40, 60];
pub const WORK_VIBRATION: &[u32] = &[100, 50, 100];
pub const REST_VIBRATION: &[u32] = &[60, 40, 60];
pub const FINISH_VIBRATION: &[u32] = &[80, 60, 80, 60, 120];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cue {
    pub bell: Option<BellPreset>,
    pub vibration: &'static [u32],
}

impl Cue {
    /// Cue for `event`, if it deserves one.
    pub fn for_event(event: &Event) -> Option<Cue> {
        match event {
            Event::CountdownTick { seconds_remaining } if *seconds_remaining == COUNTDOWN_SECONDS => {
                Some(Cue {
                    bell: None,
                    vibration: COUNTDOWN_VIBRATION,
                })
            }
            Event::PhaseEntered { phase, .. } => Some(match phase.kind {
                PhaseKind::Work if phase.ordinal == 0 => Cue {
                    bell: Some(WORK_BELL),
                    vibration: SESSION_START_VIBRATION,
                },
                PhaseKind::Work => Cue {
                    bell: Some(WORK_BELL),
                    vibration: WORK_VIBRATION,
                },
                PhaseKind::Rest => Cue {
                    bell: Some(REST_BELL),
                    vibration: REST_VIBRATION,
                },
            }),
            Event::SessionFinished => Some(Cue {
                bell: Some(FINISH_BELL),
                vibration: FINISH_VIBRATION,
            }),
            _ => None,
        }
    }
}
