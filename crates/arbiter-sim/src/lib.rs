//! arbiter-sim: testbench for the weighted round-robin arbiter.
//!
//! - **`testbench`**: register-level driver with an invariant monitor attached
//! - **`stimulus`**: seeded random trial generation
//! - **`scenario`**: directed scenarios and the randomized trial loop
//! - **`report`**: per-section grant histograms and violations

pub mod report;
pub mod scenario;
pub mod stimulus;
pub mod testbench;

pub use report::{RunReport, SectionReport};
pub use scenario::{Scenario, run_random_trials};
pub use stimulus::{Stimulus, StimulusGenerator};
pub use testbench::Testbench;
