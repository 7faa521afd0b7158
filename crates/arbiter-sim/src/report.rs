//! Run report: grant histograms per section plus any violations.

use serde::Serialize;

use arbiter_core::{REQUESTERS, SelectionPolicy, TickOutcome, Violation};

/// Counts for one named stretch of a run (a scenario or a trial).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub name: String,
    pub ticks: u64,
    pub idle_ticks: u64,
    /// Ticks each requester spent holding the grant.
    pub grants: [u64; REQUESTERS],
    /// Grant decisions (acquire or release) per requester.
    pub decisions: [u64; REQUESTERS],
}

impl SectionReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, out: &TickOutcome) {
        self.ticks += 1;
        if !out.busy() {
            self.idle_ticks += 1;
            return;
        }
        let i = out.grant_index.index();
        self.grants[i] += 1;
        if matches!(
            out.transition,
            arbiter_core::Transition::Acquired | arbiter_core::Transition::Released
        ) {
            self.decisions[i] += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub policy: SelectionPolicy,
    pub sections: Vec<SectionReport>,
    pub violations: Vec<Violation>,
}

impl RunReport {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn total_ticks(&self) -> u64 {
        self.sections.iter().map(|s| s.ticks).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn section(&self, name: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{Arbiter, RequestVector};

    #[test]
    fn section_counts_holding_and_decisions() {
        let mut arb = Arbiter::default();
        let mut section = SectionReport::new("t");
        arb.drive_inputs(RequestVector::from_bits(0b0010), false, true);
        for _ in 0..3 {
            section.record(&arb.tick());
        }
        arb.drive_inputs(RequestVector::EMPTY, false, true);
        section.record(&arb.tick());

        assert_eq!(section.ticks, 4);
        assert_eq!(section.idle_ticks, 1);
        assert_eq!(section.grants, [0, 3, 0, 0]);
        assert_eq!(section.decisions, [0, 1, 0, 0]);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = RunReport::new(SelectionPolicy::Credit);
        report.sections.push(SectionReport::new("equal"));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"policy\": \"credit\""));
        assert!(json.contains("\"equal\""));
        assert_eq!(report.total_ticks(), 0);
        assert!(report.is_clean());
    }
}
