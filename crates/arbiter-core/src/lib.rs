//! arbiter-core: four-requester weighted round-robin arbiter.
//!
//! On every tick the arbiter picks at most one of four requesters for
//! exclusive access to a shared resource:
//!
//! - Requests count only while `valid` is asserted
//! - The highest-weight eligible requester wins; ties rotate from a
//!   round-robin pointer
//! - A grant is held until it is accepted (`ready && valid`) or its request
//!   drops, and only then does the pointer advance
//! - Weights are staged in a shadow table and committed atomically
//!
//! # Architecture
//!
//! ```text
//! Arbiter
//!   ├── WeightTable (shadow → live on commit)
//!   ├── select (eligibility, max weight, tie set, round-robin scan)
//!   ├── grant state machine (Idle / Granted, hold or release)
//!   └── register map (0x2..0x6 config, 0xE/0xF readback)
//! Monitor (independent invariant checks over TickOutcome)
//! ```

pub mod arbiter;
pub mod config;
pub mod error;
pub mod monitor;
pub mod regmap;
pub mod select;
pub mod types;
pub mod weights;

pub use arbiter::{Arbiter, GrantState, GrantStatus, Inputs, TickOutcome, Transition};
pub use config::{RunConfig, StimulusConfig};
pub use error::{ArbiterError, ArbiterResult};
pub use monitor::{Monitor, Violation};
pub use types::*;
pub use weights::WeightTable;
