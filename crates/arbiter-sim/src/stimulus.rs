//! Randomized trial stimulus.
//!
//! Weights are drawn from `0..=4` with zero ten times less likely than any
//! other value, the request vector is never empty, and the ready/valid
//! pair is `11` seventy percent of the time unless forced.

use std::fmt;

use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use arbiter_core::{REQUESTERS, RequestVector, Weight, Weights};

const WEIGHT_VALUES: [u8; 5] = [0, 1, 2, 3, 4];
const WEIGHT_ODDS: [u32; 5] = [1, 9, 9, 9, 9];

/// `(ready, valid)` codes `11`, `10`, `01`, `00`.
const HANDSHAKE_CODES: [(bool, bool); 4] = [(true, true), (true, false), (false, true), (false, false)];
const HANDSHAKE_ODDS: [u32; 4] = [70, 10, 10, 10];

/// One trial's configuration and input levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stimulus {
    pub weights: Weights,
    pub requests: RequestVector,
    pub ready: bool,
    pub valid: bool,
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [w0, w1, w2, w3] = self.weights;
        write!(
            f,
            "w={w0}:{w1}:{w2}:{w3} reqs={} ready={} valid={}",
            self.requests,
            u8::from(self.ready),
            u8::from(self.valid)
        )
    }
}

/// Seeded stimulus source; the same seed always yields the same trials.
pub struct StimulusGenerator {
    rng: StdRng,
    weights: WeightedIndex<u32>,
    handshake: WeightedIndex<u32>,
    force_handshake: bool,
}

impl StimulusGenerator {
    pub fn new(seed: u64, force_handshake: bool) -> anyhow::Result<Self> {
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            weights: WeightedIndex::new(WEIGHT_ODDS)?,
            handshake: WeightedIndex::new(HANDSHAKE_ODDS)?,
            force_handshake,
        })
    }

    pub fn next_stimulus(&mut self) -> Stimulus {
        let mut weights = [Weight::ZERO; REQUESTERS];
        for w in &mut weights {
            *w = Weight::masked(WEIGHT_VALUES[self.weights.sample(&mut self.rng)]);
        }

        let requests = RequestVector::from_bits(self.rng.gen_range(1..16));

        let (ready, valid) = if self.force_handshake {
            (true, true)
        } else {
            HANDSHAKE_CODES[self.handshake.sample(&mut self.rng)]
        };

        Stimulus {
            weights,
            requests,
            ready,
            valid,
        }
    }
}

impl Iterator for StimulusGenerator {
    type Item = Stimulus;

    fn next(&mut self) -> Option<Stimulus> {
        Some(self.next_stimulus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_trials() {
        let a: Vec<Stimulus> = StimulusGenerator::new(2, false).unwrap().take(20).collect();
        let b: Vec<Stimulus> = StimulusGenerator::new(2, false).unwrap().take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn stimulus_stays_in_bounds() {
        for s in StimulusGenerator::new(99, false).unwrap().take(500) {
            assert!(!s.requests.is_empty());
            assert!(s.weights.iter().all(|w| w.get() <= 4));
        }
    }

    #[test]
    fn forced_handshake_pins_ready_and_valid() {
        for s in StimulusGenerator::new(5, true).unwrap().take(100) {
            assert!(s.ready && s.valid);
        }
    }

    #[test]
    fn handshake_mostly_asserted() {
        let both = StimulusGenerator::new(1, false)
            .unwrap()
            .take(2000)
            .filter(|s| s.ready && s.valid)
            .count();
        assert!((1200..1600).contains(&both), "got {both}");
    }

    #[test]
    fn display_matches_trial_log_format() {
        let s = Stimulus {
            weights: arbiter_core::weights_from_raw([1, 0, 4, 2]).unwrap(),
            requests: RequestVector::from_bits(0b0101),
            ready: true,
            valid: false,
        };
        assert_eq!(s.to_string(), "w=1:0:4:2 reqs=0101 ready=1 valid=0");
    }
}
