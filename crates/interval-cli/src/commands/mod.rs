pub mod config;
pub mod run;
pub mod schedule;

use clap::Args;
use interval_core::{resolve, Config, Configuration};

/// Session flags shared by `run` and `schedule show`.
///
/// Anything left out comes from the stored configuration. Values are
/// resolved, so `--work 44` runs 40-second work phases.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionOverrides {
    /// Work phase length in seconds (10-60, step 10)
    #[arg(long, allow_negative_numbers = true)]
    pub work: Option<f64>,
    /// Rest phase length in seconds (10-60, step 10)
    #[arg(long, allow_negative_numbers = true)]
    pub rest: Option<f64>,
    /// Number of sets (1-10)
    #[arg(long, allow_negative_numbers = true)]
    pub sets: Option<f64>,
}

impl SessionOverrides {
    pub fn resolve_over(&self, config: &Config) -> Configuration {
        let stored = config.configuration();
        resolve(
            self.work.unwrap_or(f64::from(stored.work_seconds())),
            self.rest.unwrap_or(f64::from(stored.rest_seconds())),
            self.sets.unwrap_or(f64::from(stored.set_count())),
        )
    }
}
