//! Cycle-level testbench.
//!
//! Configures the arbiter through its register map, drives the request
//! and handshake lines, clocks it, reads grant status back over the
//! registers, and feeds every tick to a `Monitor`.

use tracing::{debug, info};

use arbiter_core::regmap::{COMMIT, WEIGHT_0};
use arbiter_core::{
    Arbiter, ArbiterResult, GrantStatus, GrantVector, Monitor, RequestVector, SelectionPolicy,
    TickOutcome, Weights,
};

use crate::report::{RunReport, SectionReport};

pub struct Testbench {
    arb: Arbiter,
    monitor: Monitor,
    report: RunReport,
}

impl Testbench {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            arb: Arbiter::new(policy),
            monitor: Monitor::new(),
            report: RunReport::new(policy),
        }
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arb
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }

    /// Start a new named section; subsequent ticks are counted under it.
    pub fn begin_section(&mut self, name: impl Into<String>) {
        let section = SectionReport::new(name);
        debug!(section = %section.name, "section started");
        self.report.sections.push(section);
    }

    /// Reset the arbiter and the monitor's history together.
    pub fn reset(&mut self) {
        self.arb.reset();
        self.monitor.reset();
        debug!("testbench reset");
    }

    /// Write all four weights, commit, and let the commit tick pass.
    pub fn cfg_weights(&mut self, weights: &Weights) -> ArbiterResult<()> {
        for (offset, w) in weights.iter().enumerate() {
            self.arb.write_reg(WEIGHT_0 + offset as u8, w.get())?;
        }
        self.arb.write_reg(COMMIT, 0x01)?;
        self.clock();
        Ok(())
    }

    /// Drive the request and handshake lines, then clock once.
    pub fn drive(&mut self, requests: RequestVector, ready: bool, valid: bool) -> TickOutcome {
        self.arb.drive_inputs(requests, ready, valid);
        self.clock()
    }

    /// Clock `n` cycles with the inputs unchanged.
    pub fn idle(&mut self, n: u32) {
        for _ in 0..n {
            self.clock();
        }
    }

    /// Clock once and log the grant status as read over the bus.
    pub fn show_grant_status(&mut self, tag: &str) -> (GrantStatus, GrantVector) {
        let out = self.clock();
        info!(
            tag,
            tick = out.tick,
            busy = out.busy(),
            gi = %out.grant_index,
            gv = %out.grant_vector,
            "grant status"
        );
        (out.status(), out.grant_vector)
    }

    /// Tick, replace the grant fields with the register readback, check
    /// the result, and count it in the current section.
    pub fn clock(&mut self) -> TickOutcome {
        let mut out = self.arb.tick();
        let (status, vector) = self.arb.read_back();
        out.grant_index = status.grant_index;
        out.grant_vector = vector;

        let found = self.monitor.observe(&out);
        self.report.violations.extend(found);
        if let Some(section) = self.report.sections.last_mut() {
            section.record(&out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::weights_from_raw;

    #[test]
    fn cfg_weights_commits_after_one_clock() {
        let mut tb = Testbench::new(SelectionPolicy::Strict);
        tb.cfg_weights(&weights_from_raw([1, 2, 3, 4]).unwrap()).unwrap();
        assert_eq!(tb.arbiter().weights().live(), &weights_from_raw([1, 2, 3, 4]).unwrap());
        assert_eq!(tb.arbiter().ticks(), 1);
    }

    #[test]
    fn drive_and_readback_agree_with_core() {
        let mut tb = Testbench::new(SelectionPolicy::Strict);
        tb.begin_section("t");
        tb.cfg_weights(&weights_from_raw([1, 1, 1, 1]).unwrap()).unwrap();
        let out = tb.drive(RequestVector::from_bits(0b1000), false, true);
        assert_eq!(out.grant_vector.bits(), 0b1000);

        let (status, vector) = tb.show_grant_status("t");
        assert!(status.busy);
        assert_eq!(status.grant_index.index(), 3);
        assert_eq!(vector.bits(), 0b1000);

        let section = tb.report().section("t").unwrap();
        assert_eq!(section.ticks, 3);
        assert_eq!(section.grants, [0, 0, 0, 2]);
        assert!(tb.report().is_clean());
    }

    #[test]
    fn ticks_before_any_section_are_not_counted() {
        let mut tb = Testbench::new(SelectionPolicy::Strict);
        tb.idle(3);
        assert!(tb.report().sections.is_empty());
        assert_eq!(tb.arbiter().ticks(), 3);
    }
}
