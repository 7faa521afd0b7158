//! Invariant monitor.
//!
//! Watches the stream of tick outcomes and re-derives what the arbiter
//! should have done from the sampled input lines and the reported weight
//! table, keeping its own mirror of the rotation pointer. The `eligible`
//! field the arbiter reports is never trusted. Anything that disagrees is
//! reported as a `Violation`. Used by tests and the simulation harness; the arbiter
//! itself never consults it.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::arbiter::TickOutcome;
use crate::select;
use crate::types::{GrantVector, RequesterId, Weight};

/// A broken arbiter guarantee, tagged with the tick it was seen on.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("tick {tick}: onehot violation, grant vector {vector}")]
    OneHot { tick: u64, vector: GrantVector },

    #[error("tick {tick}: grant vector {vector} does not match grant index {index}")]
    VectorIndexMismatch {
        tick: u64,
        vector: GrantVector,
        index: RequesterId,
    },

    #[error("tick {tick}: grant moved from {from} to {to} ({vector}) without acceptance")]
    RotateWithoutAccept {
        tick: u64,
        from: RequesterId,
        to: RequesterId,
        vector: GrantVector,
    },

    #[error("tick {tick}: selected {actual:?}, expected {expected:?}")]
    SelectionMismatch {
        tick: u64,
        expected: Option<RequesterId>,
        actual: Option<RequesterId>,
    },

    #[error("tick {tick}: requester {index} granted with weight {weight} below eligible max {max}")]
    NotMaxWeight {
        tick: u64,
        index: RequesterId,
        weight: Weight,
        max: Weight,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Monitor {
    pointer: RequesterId,
    prev_index: RequesterId,
    prev_vector: GrantVector,
    samples: u64,
    violations: Vec<Violation>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all history, mirroring an arbiter reset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Check one tick. Returns the violations found on this tick.
    pub fn observe(&mut self, out: &TickOutcome) -> Vec<Violation> {
        let mut found = Vec::new();
        let tick = out.tick;
        let vector = out.grant_vector;
        let index = out.grant_index;
        let eligible = select::eligible(out.inputs.requests, out.inputs.valid);

        if vector.count_ones() > 1 {
            found.push(Violation::OneHot { tick, vector });
        } else if !vector.is_empty() && vector != GrantVector::one_hot(index) {
            found.push(Violation::VectorIndexMismatch { tick, vector, index });
        }

        // Selection runs from idle, or after the outstanding grant released.
        let selection_pointer = if self.prev_vector.is_empty() {
            Some(self.pointer)
        } else {
            let holder = self.prev_index;
            let held = out.inputs.requests.is_set(holder) && !out.inputs.handshake();
            if held {
                if vector != self.prev_vector || index != holder {
                    found.push(Violation::RotateWithoutAccept {
                        tick,
                        from: holder,
                        to: index,
                        vector,
                    });
                }
                None
            } else {
                self.pointer = holder.next();
                Some(self.pointer)
            }
        };

        if let Some(pointer) = selection_pointer {
            let expected = select::select(eligible, &out.weights, pointer);
            let actual = vector.holder();
            if expected != actual {
                found.push(Violation::SelectionMismatch {
                    tick,
                    expected,
                    actual,
                });
            }
            if let (Some(winner), Some(max)) =
                (actual, select::max_weight(eligible, &out.weights))
            {
                let weight = out.weights[winner.index()];
                if weight < max {
                    found.push(Violation::NotMaxWeight {
                        tick,
                        index: winner,
                        weight,
                        max,
                    });
                }
            }
        }

        for v in &found {
            error!(violation = %v, "arbiter invariant violated");
        }

        self.prev_index = index;
        self.prev_vector = vector;
        self.samples += 1;
        self.violations.extend(found.iter().cloned());
        found
    }
}
