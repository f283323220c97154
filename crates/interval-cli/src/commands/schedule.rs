use clap::Subcommand;
use interval_core::{build_schedule, Config};

use super::SessionOverrides;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Print the phases a session would run
    Show {
        #[command(flatten)]
        session: SessionOverrides,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn format_mmss(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Show { session, json } => {
            let config = Config::load_or_default();
            let configuration = session.resolve_over(&config);
            let schedule = build_schedule(&configuration);

            if json {
                let phases: Vec<serde_json::Value> = schedule
                    .phases()
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "ordinal": p.ordinal,
                            "kind": p.kind,
                            "set_index": p.set_index,
                            "duration_secs": p.duration_secs,
                            "label": schedule.label(p),
                        })
                    })
                    .collect();
                let out = serde_json::json!({
                    "configuration": configuration,
                    "phases": phases,
                    "total_secs": schedule.total_secs(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for p in schedule.phases() {
                    println!(
                        "{:>2}  {:<9} {:>3}s  starts at {}",
                        p.ordinal,
                        schedule.label(p),
                        p.duration_secs,
                        format_mmss(schedule.cumulative_secs(p.ordinal))
                    );
                }
                println!("total {}", format_mmss(schedule.total_secs()));
            }
        }
    }
    Ok(())
}
