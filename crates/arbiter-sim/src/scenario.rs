//! Directed scenarios and randomized trials.

use tracing::info;

use arbiter_core::{ArbiterResult, RequestVector, StimulusConfig, Weights, weights_from_raw};

use crate::stimulus::StimulusGenerator;
use crate::testbench::Testbench;

/// Idle cycles between the directed scenarios and the random trials.
const SETTLE_CYCLES: u32 = 5;

/// A directed scenario: fixed weights, every request asserted, handshake
/// completing on every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Weights 1:1:1:1 over 12 cycles.
    EqualWeights,
    /// Weights 2:1:1:2 over 20 cycles.
    Weighted,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::EqualWeights, Scenario::Weighted];

    pub fn name(self) -> &'static str {
        match self {
            Self::EqualWeights => "equal",
            Self::Weighted => "weighted",
        }
    }

    pub fn weights(self) -> ArbiterResult<Weights> {
        match self {
            Self::EqualWeights => weights_from_raw([1, 1, 1, 1]),
            Self::Weighted => weights_from_raw([2, 1, 1, 2]),
        }
    }

    pub fn cycles(self) -> u32 {
        match self {
            Self::EqualWeights => 12,
            Self::Weighted => 20,
        }
    }

    pub fn run(self, tb: &mut Testbench) -> ArbiterResult<()> {
        info!(scenario = self.name(), "running directed scenario");
        tb.begin_section(self.name());
        tb.cfg_weights(&self.weights()?)?;
        tb.drive(RequestVector::ALL, true, true);
        for _ in 0..self.cycles() {
            tb.show_grant_status(self.name());
        }
        Ok(())
    }
}

/// Settle, then run `trials` randomized trials of `cycles` cycles each.
pub fn run_random_trials(tb: &mut Testbench, cfg: &StimulusConfig) -> anyhow::Result<()> {
    info!(seed = cfg.seed, trials = cfg.trials, cycles = cfg.cycles, "running randomized trials");
    tb.idle(SETTLE_CYCLES);

    let mut stimuli = StimulusGenerator::new(cfg.seed, cfg.force_handshake)?;
    for trial in 0..cfg.trials {
        let s = stimuli.next_stimulus();
        let tag = format!("trial-{trial}");
        info!(trial, stimulus = %s, "randomized trial");

        tb.begin_section(tag.as_str());
        tb.cfg_weights(&s.weights)?;
        tb.drive(s.requests, s.ready, s.valid);
        for _ in 0..cfg.cycles {
            tb.show_grant_status(&tag);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::SelectionPolicy;

    #[test]
    fn equal_weights_scenario_spreads_grants_evenly() {
        let mut tb = Testbench::new(SelectionPolicy::Strict);
        Scenario::EqualWeights.run(&mut tb).unwrap();

        let section = tb.report().section("equal").unwrap();
        // commit tick + drive tick + 12 status cycles
        assert_eq!(section.ticks, 14);
        assert_eq!(section.idle_ticks, 1);
        assert_eq!(section.grants.iter().sum::<u64>(), 13);
        assert!(section.grants.iter().all(|g| (3..=4).contains(g)));
        assert!(tb.report().is_clean());
    }

    #[test]
    fn weighted_scenario_under_credit_policy() {
        let mut tb = Testbench::new(SelectionPolicy::Credit);
        Scenario::Weighted.run(&mut tb).unwrap();

        let section = tb.report().section("weighted").unwrap();
        // Grants cycle 0,3,0,1,2,3 over the 21 busy ticks.
        assert_eq!(section.ticks, 22);
        assert_eq!(section.idle_ticks, 1);
        assert_eq!(section.grants, [8, 3, 3, 7]);
        assert!(tb.report().is_clean());
    }

    #[test]
    fn random_trials_are_clean_and_sectioned() {
        let mut tb = Testbench::new(SelectionPolicy::Strict);
        let cfg = StimulusConfig::default();
        run_random_trials(&mut tb, &cfg).unwrap();

        let report = tb.into_report();
        assert_eq!(report.sections.len(), 8);
        assert!(report.sections.iter().all(|s| s.ticks == 12));
        assert!(report.is_clean(), "{:?}", report.violations);
    }
}
