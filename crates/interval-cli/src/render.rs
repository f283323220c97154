//! Terminal renderer for clock events.
//!
//! Text mode prints the phase label, countdown digits and a progress bar,
//! ringing the terminal bell for cues. JSON mode prints one timestamped
//! object per event. Output failures are logged and otherwise ignored so a
//! closed pipe never disturbs the session clock.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;

use interval_core::storage::CueSettings;
use interval_core::timer::FINISHED_LABEL;
use interval_core::{Cue, Event, EventSink};

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    at: DateTime<Local>,
    #[serde(flatten)]
    event: &'a Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    cue: Option<Cue>,
}

pub struct TerminalRenderer<W: Write> {
    out: W,
    mode: OutputMode,
    cues: CueSettings,
    /// Last progress percentage written; progress arrives every frame.
    last_percent: Option<u32>,
    /// A `\r` progress line is open and needs a newline before other output.
    bar_open: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, mode: OutputMode, cues: CueSettings) -> Self {
        Self {
            out,
            mode,
            cues,
            last_percent: None,
            bar_open: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &Event) -> std::io::Result<()> {
        if let Event::Progress { fraction } = event {
            let percent = (fraction * 100.0).floor() as u32;
            if self.last_percent == Some(percent) {
                return Ok(());
            }
            self.last_percent = Some(percent);
        }

        let cue = Cue::for_event(event);
        if let Some(cue) = &cue {
            if self.cues.vibration {
                tracing::debug!(pattern = ?cue.vibration, "vibration cue (no actuator)");
            }
        }

        match self.mode {
            OutputMode::Json => {
                let line = JsonLine {
                    at: Local::now(),
                    event,
                    cue,
                };
                let json = serde_json::to_string(&line).map_err(std::io::Error::other)?;
                writeln!(self.out, "{json}")?;
            }
            OutputMode::Text => self.write_text(event, cue)?,
        }
        self.out.flush()
    }

    fn write_text(&mut self, event: &Event, cue: Option<Cue>) -> std::io::Result<()> {
        if !matches!(event, Event::Progress { .. }) && self.bar_open {
            writeln!(self.out)?;
            self.bar_open = false;
        }
        match event {
            Event::CountdownTick { seconds_remaining } => {
                writeln!(self.out, "Get ready... {seconds_remaining}")?;
            }
            Event::PhaseEntered { phase, label } => {
                writeln!(self.out, "{label}  ({}s)", phase.duration_secs)?;
            }
            Event::Progress { fraction } => {
                let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
                write!(
                    self.out,
                    "\r[{}{}] {:>3}%",
                    "#".repeat(filled),
                    ".".repeat(BAR_WIDTH - filled),
                    (fraction * 100.0).floor() as u32
                )?;
                self.bar_open = true;
            }
            Event::SessionFinished => {
                writeln!(self.out, "{FINISHED_LABEL}")?;
            }
            Event::SessionReset => {
                self.last_percent = None;
                writeln!(self.out, "Reset.")?;
            }
        }
        if let Some(bell) = cue.and_then(|c| c.bell) {
            if self.cues.sound {
                for _ in 0..bell.strikes {
                    write!(self.out, "\x07")?;
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> EventSink for TerminalRenderer<W> {
    fn emit(&mut self, event: Event) {
        if let Err(e) = self.write_event(&event) {
            tracing::warn!(error = %e, "failed to render event");
        }
    }
}
