//! Arbiter core: grant hold/rotate state machine.
//!
//! One `tick()` is one scheduling cycle. Inputs latched with
//! `drive_inputs` and a pending `commit_weights` are read as a single
//! snapshot; the next state is computed in full from that snapshot and
//! the current state, then published.
//!
//! ```text
//!            eligible != 0                 handshake or request dropped
//!   Idle ──────────────────────▶ Granted ───────────────────────────────┐
//!    ▲                             │  ▲   pointer = holder + 1, reselect │
//!    │       nothing eligible      │  └─────────────────────────────────┘
//!    └─────────────────────────────┘  held while requested and unaccepted
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::ArbiterResult;
use crate::select;
use crate::types::{
    GrantVector, REQUESTERS, RequestVector, RequesterId, SelectionPolicy, Weight, Weights,
};
use crate::weights::WeightTable;

/// Externally driven lines, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Inputs {
    pub requests: RequestVector,
    pub ready: bool,
    pub valid: bool,
}

impl Inputs {
    pub fn new(requests: RequestVector, ready: bool, valid: bool) -> Self {
        Self { requests, ready, valid }
    }

    /// The current grant was accepted this tick.
    pub fn handshake(&self) -> bool {
        self.ready && self.valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrantState {
    Idle,
    Granted(RequesterId),
}

/// Status register contents: last granted index plus busy flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrantStatus {
    pub grant_index: RequesterId,
    pub busy: bool,
}

/// How the grant state moved on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Idle before and after.
    Idle,
    /// Idle before, a winner was selected.
    Acquired,
    /// Outstanding grant kept as-is.
    Held,
    /// Outstanding grant released; pointer advanced and selection re-ran.
    Released,
}

/// Everything observable about one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    /// Tick number since the last reset, starting at 1.
    pub tick: u64,
    pub inputs: Inputs,
    pub eligible: RequestVector,
    /// Weight table the selection step compared (live weights, or credits
    /// under the credit policy).
    pub weights: Weights,
    pub transition: Transition,
    pub grant_index: RequesterId,
    pub grant_vector: GrantVector,
    /// A staged weight table was promoted at the end of this tick.
    pub committed: bool,
}

impl TickOutcome {
    pub fn busy(&self) -> bool {
        !self.grant_vector.is_empty()
    }

    pub fn status(&self) -> GrantStatus {
        GrantStatus {
            grant_index: self.grant_index,
            busy: self.busy(),
        }
    }
}

/// Four-requester weighted round-robin arbiter.
#[derive(Debug, Clone)]
pub struct Arbiter {
    policy: SelectionPolicy,
    weights: WeightTable,
    credits: Weights,
    pointer: RequesterId,
    grant_index: RequesterId,
    grant_vector: GrantVector,
    inputs: Inputs,
    commit_pending: bool,
    ticks: u64,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(SelectionPolicy::default())
    }
}

impl Arbiter {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            weights: WeightTable::new(),
            credits: [Weight::ZERO; REQUESTERS],
            pointer: RequesterId::default(),
            grant_index: RequesterId::default(),
            grant_vector: GrantVector::NONE,
            inputs: Inputs::default(),
            commit_pending: false,
            ticks: 0,
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Stage weight `index` into the shadow table.
    pub fn set_weight(&mut self, index: usize, value: u8) -> ArbiterResult<()> {
        let id = RequesterId::new(index)?;
        let weight = Weight::new(value)?;
        self.weights.stage(id, weight);
        Ok(())
    }

    pub fn stage_weights(&mut self, weights: Weights) {
        self.weights.stage_all(weights);
    }

    /// Request promotion of the shadow table. Sampled by the next tick,
    /// whose own selection still uses the previous live table.
    pub fn commit_weights(&mut self) {
        self.commit_pending = true;
    }

    pub fn drive_inputs(&mut self, requests: RequestVector, ready: bool, valid: bool) {
        self.inputs = Inputs::new(requests, ready, valid);
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn credits(&self) -> &Weights {
        &self.credits
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn state(&self) -> GrantState {
        match self.grant_vector.holder() {
            Some(id) => GrantState::Granted(id),
            None => GrantState::Idle,
        }
    }

    pub fn read_status(&self) -> GrantStatus {
        GrantStatus {
            grant_index: self.grant_index,
            busy: !self.grant_vector.is_empty(),
        }
    }

    pub fn read_grant_vector(&self) -> GrantVector {
        self.grant_vector
    }

    /// Return every piece of state to its power-on value.
    pub fn reset(&mut self) {
        self.weights.clear();
        self.credits = [Weight::ZERO; REQUESTERS];
        self.pointer = RequesterId::default();
        self.grant_index = RequesterId::default();
        self.grant_vector = GrantVector::NONE;
        self.inputs = Inputs::default();
        self.commit_pending = false;
        self.ticks = 0;
        debug!(policy = %self.policy, "arbiter reset");
    }

    /// Advance one scheduling cycle.
    pub fn tick(&mut self) -> TickOutcome {
        let inputs = self.inputs;
        let eligible = select::eligible(inputs.requests, inputs.valid);
        let mut credits = self.credits;
        let mut pointer = self.pointer;

        let (next, transition, effective) = match self.state() {
            GrantState::Idle => {
                let (winner, effective) = self.choose(eligible, &mut credits, pointer);
                match winner {
                    Some(id) => (GrantState::Granted(id), Transition::Acquired, effective),
                    None => (GrantState::Idle, Transition::Idle, effective),
                }
            }
            GrantState::Granted(holder)
                if inputs.requests.is_set(holder) && !inputs.handshake() =>
            {
                let effective = self.effective(&credits);
                (GrantState::Granted(holder), Transition::Held, effective)
            }
            GrantState::Granted(holder) => {
                if inputs.handshake() && self.policy == SelectionPolicy::Credit {
                    credits[holder.index()] = credits[holder.index()].saturating_dec();
                }
                pointer = holder.next();
                let (winner, effective) = self.choose(eligible, &mut credits, pointer);
                let next = winner.map_or(GrantState::Idle, GrantState::Granted);
                (next, Transition::Released, effective)
            }
        };

        // Publish the next state.
        self.ticks += 1;
        self.pointer = pointer;
        self.credits = credits;
        match next {
            GrantState::Granted(id) => {
                self.grant_index = id;
                self.grant_vector = GrantVector::one_hot(id);
            }
            GrantState::Idle => self.grant_vector = GrantVector::NONE,
        }
        debug_assert!(
            self.grant_vector.is_empty()
                || self.grant_vector == GrantVector::one_hot(self.grant_index),
            "grant vector {} does not match index {}",
            self.grant_vector,
            self.grant_index
        );

        let committed = std::mem::take(&mut self.commit_pending);
        if committed {
            self.weights.commit();
            if self.policy == SelectionPolicy::Credit {
                self.credits = *self.weights.live();
            }
            debug!(tick = self.ticks, live = ?self.weights.live(), "weights committed");
        }

        match transition {
            Transition::Acquired | Transition::Released => debug!(
                tick = self.ticks,
                ?transition,
                eligible = %eligible,
                grant_index = %self.grant_index,
                grant_vector = %self.grant_vector,
                "grant decision"
            ),
            Transition::Idle | Transition::Held => trace!(
                tick = self.ticks,
                ?transition,
                grant_vector = %self.grant_vector,
                "tick"
            ),
        }

        TickOutcome {
            tick: self.ticks,
            inputs,
            eligible,
            weights: effective,
            transition,
            grant_index: self.grant_index,
            grant_vector: self.grant_vector,
            committed,
        }
    }

    fn effective(&self, credits: &Weights) -> Weights {
        match self.policy {
            SelectionPolicy::Strict => *self.weights.live(),
            SelectionPolicy::Credit => *credits,
        }
    }

    /// Run selection against the policy's weight table, reloading spent
    /// credits first when every eligible requester is at zero.
    fn choose(
        &self,
        eligible: RequestVector,
        credits: &mut Weights,
        pointer: RequesterId,
    ) -> (Option<RequesterId>, Weights) {
        if self.policy == SelectionPolicy::Credit
            && select::max_weight(eligible, credits) == Some(Weight::ZERO)
        {
            *credits = *self.weights.live();
            trace!(credits = ?credits, "credits reloaded");
        }
        let effective = self.effective(credits);
        (select::select(eligible, &effective, pointer), effective)
    }
}
