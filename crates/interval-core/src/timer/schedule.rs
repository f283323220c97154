use serde::Serialize;
use std::time::Duration;

use super::config::Configuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Work,
    Rest,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Work => "Work",
            PhaseKind::Rest => "Rest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub kind: PhaseKind,
    /// Duration in whole seconds, always > 0.
    pub duration_secs: u64,
    /// 1-based set this phase belongs to. A rest shares the index of the
    /// work phase before it.
    pub set_index: u32,
    /// 0-based position in the schedule.
    pub ordinal: usize,
}

impl Phase {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// Ordered, immutable phase list derived from a [`Configuration`].
///
/// Rebuild it with [`build_schedule`] whenever the configuration changes;
/// nothing patches a schedule in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    phases: Vec<Phase>,
    total_secs: u64,
    set_count: u32,
}

/// Expand a configuration into alternating work/rest phases.
pub fn build_schedule(config: &Configuration) -> Schedule {
    let sets = config.set_count();
    let mut phases = Vec::with_capacity((sets as usize * 2).saturating_sub(1));
    for i in 0..sets {
        phases.push(Phase {
            kind: PhaseKind::Work,
            duration_secs: u64::from(config.work_seconds()),
            set_index: i + 1,
            ordinal: phases.len(),
        });
        if i + 1 < sets {
            phases.push(Phase {
                kind: PhaseKind::Rest,
                duration_secs: u64::from(config.rest_seconds()),
                set_index: i + 1,
                ordinal: phases.len(),
            });
        }
    }
    let total_secs = phases.iter().map(|p| p.duration_secs).sum();
    Schedule {
        phases,
        total_secs,
        set_count: sets,
    }
}

impl Schedule {
    /// A schedule with no phases. Clamped configurations never produce one;
    /// the clock treats it as "nothing to start".
    pub fn empty() -> Self {
        Self {
            phases: Vec::new(),
            total_secs: 0,
            set_count: 0,
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }

    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    pub fn work_count(&self) -> usize {
        self.phases
            .iter()
            .filter(|p| p.kind == PhaseKind::Work)
            .count()
    }

    /// Seconds scheduled before (not including) `index`.
    pub fn cumulative_secs(&self, index: usize) -> u64 {
        self.phases
            .iter()
            .take(index)
            .map(|p| p.duration_secs)
            .sum()
    }

    /// Display label, e.g. "Work 2/3" or "Rest 1/3".
    pub fn label(&self, phase: &Phase) -> String {
        format!(
            "{} {}/{}",
            phase.kind.as_str(),
            phase.set_index,
            self.set_count
        )
    }
}

impl Default for Schedule {
    fn default() -> Self {
        build_schedule(&Configuration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::config::resolve;
    use proptest::prelude::*;

    #[test]
    fn default_schedule_has_5_phases() {
        let s = Schedule::default();
        assert_eq!(s.len(), 5);
        assert_eq!(s.work_count(), 3);
        assert_eq!(s.total_secs(), 3 * 30 + 2 * 30);
    }

    #[test]
    fn two_sets_of_ten() {
        let s = build_schedule(&resolve(10.0, 10.0, 2.0));
        let shape: Vec<_> = s
            .phases()
            .iter()
            .map(|p| (p.kind, p.duration_secs, p.set_index, p.ordinal))
            .collect();
        assert_eq!(
            shape,
            vec![
                (PhaseKind::Work, 10, 1, 0),
                (PhaseKind::Rest, 10, 1, 1),
                (PhaseKind::Work, 10, 2, 2),
            ]
        );
        assert_eq!(s.total_secs(), 30);
    }

    #[test]
    fn single_set_has_no_rest() {
        let s = build_schedule(&resolve(40.0, 20.0, 1.0));
        assert_eq!(s.len(), 1);
        assert_eq!(s.phases()[0].kind, PhaseKind::Work);
        assert_eq!(s.total_secs(), 40);
    }

    #[test]
    fn labels_carry_set_progress() {
        let s = build_schedule(&resolve(10.0, 10.0, 3.0));
        let labels: Vec<_> = s.phases().iter().map(|p| s.label(p)).collect();
        assert_eq!(
            labels,
            vec!["Work 1/3", "Rest 1/3", "Work 2/3", "Rest 2/3", "Work 3/3"]
        );
    }

    #[test]
    fn cumulative_secs_counts_earlier_phases() {
        let s = build_schedule(&resolve(20.0, 10.0, 3.0));
        assert_eq!(s.cumulative_secs(0), 0);
        assert_eq!(s.cumulative_secs(1), 20);
        assert_eq!(s.cumulative_secs(3), 50);
        assert_eq!(s.cumulative_secs(99), s.total_secs());
    }

    #[test]
    fn empty_schedule() {
        let s = Schedule::empty();
        assert!(s.is_empty());
        assert_eq!(s.total_secs(), 0);
        assert!(s.phase(0).is_none());
    }

    proptest! {
        #[test]
        fn schedule_shape_holds_for_all_configs(
            work in 1u32..=6,
            rest in 1u32..=6,
            sets in 1u32..=10,
        ) {
            let cfg = resolve(f64::from(work * 10), f64::from(rest * 10), f64::from(sets));
            let s = build_schedule(&cfg);
            let n = cfg.set_count() as usize;

            prop_assert_eq!(s.len(), 2 * n - 1);
            prop_assert_eq!(s.phases().first().map(|p| p.kind), Some(PhaseKind::Work));
            prop_assert_eq!(s.phases().last().map(|p| p.kind), Some(PhaseKind::Work));
            for pair in s.phases().windows(2) {
                prop_assert_ne!(pair[0].kind, pair[1].kind);
            }
            for (i, p) in s.phases().iter().enumerate() {
                prop_assert_eq!(p.ordinal, i);
                prop_assert!(p.duration_secs > 0);
            }
            let expected = u64::from(cfg.set_count()) * u64::from(cfg.work_seconds())
                + u64::from(cfg.set_count() - 1) * u64::from(cfg.rest_seconds());
            prop_assert_eq!(s.total_secs(), expected);
        }
    }
}
