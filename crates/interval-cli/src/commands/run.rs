use clap::Args;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use interval_core::{
    build_schedule, Config, EventSink, InstantSource, MonotonicSource, SessionClock,
};

use super::SessionOverrides;
use crate::render::{OutputMode, TerminalRenderer};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionOverrides,
    /// Emit one JSON object per event instead of text
    #[arg(long)]
    pub json: bool,
    /// Store the resolved configuration as the new default
    #[arg(long)]
    pub save: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    let configuration = args.session.resolve_over(&config);
    if args.save {
        config.commit(configuration);
        config.save()?;
    }

    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let mut renderer = TerminalRenderer::new(std::io::stdout().lock(), mode, config.cues.clone());
    let frame = config.frame_interval();
    let source = InstantSource::new();
    let mut clock = SessionClock::new(build_schedule(&configuration));
    tracing::info!(
        work = configuration.work_seconds(),
        rest = configuration.rest_seconds(),
        sets = configuration.set_count(),
        "session requested"
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "Ctrl-C handler unavailable; session cannot be stopped early");
    }

    clock.start(source.now(), &mut renderer);
    let stopped = drive(
        &mut clock,
        || {
            std::thread::sleep(frame);
            source.now()
        },
        &interrupted,
        &mut renderer,
    );
    if stopped {
        tracing::info!("session stopped by user");
    }
    Ok(())
}

/// Tick `clock` once per frame until it goes idle.
///
/// `next_frame` waits for the next frame and returns the current monotonic
/// time. Once `interrupted` is set the clock is stopped, which raises
/// `SessionReset`. Returns whether the session was stopped that way.
fn drive(
    clock: &mut SessionClock,
    mut next_frame: impl FnMut() -> Duration,
    interrupted: &AtomicBool,
    sink: &mut impl EventSink,
) -> bool {
    while clock.needs_tick() {
        let now = next_frame();
        if interrupted.load(Ordering::SeqCst) {
            clock.stop(sink);
            return true;
        }
        clock.tick(now, sink);
    }
    false
}
