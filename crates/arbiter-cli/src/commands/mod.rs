pub mod init;
pub mod random;
pub mod scenario;

use std::path::Path;

use anyhow::Context;
use arbiter_core::{RunConfig, SelectionPolicy};
use arbiter_sim::{RunReport, Testbench};
use tracing::info;

use crate::Format;

/// Read the config file if one was given, then apply the policy override.
pub fn load_config(path: Option<&Path>, policy: Option<SelectionPolicy>) -> anyhow::Result<RunConfig> {
    let mut config = match path {
        Some(p) => RunConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display()))?,
        None => RunConfig::default(),
    };
    if let Some(policy) = policy {
        config.policy = policy;
    }
    Ok(config)
}

/// Fresh testbench with the config's initial weights committed.
pub fn prepare(config: &RunConfig) -> anyhow::Result<Testbench> {
    info!(policy = %config.policy, weights = config.weights.is_some(), "run started");
    let mut tb = Testbench::new(config.policy);
    tb.reset();
    if let Some(weights) = &config.weights {
        tb.cfg_weights(weights)?;
    }
    Ok(tb)
}

/// Print the report and fail when any violation was recorded.
pub fn finish(report: &RunReport, format: Format) -> anyhow::Result<()> {
    info!(
        ticks = report.total_ticks(),
        violations = report.violations.len(),
        "run finished"
    );
    match format {
        Format::Json => println!("{}", report.to_json()?),
        Format::Text => println!("{}", format_report(report)),
    }
    if !report.is_clean() {
        anyhow::bail!("{} invariant violation(s) detected", report.violations.len());
    }
    Ok(())
}

pub fn format_report(report: &RunReport) -> String {
    let mut out = format!("policy: {}\n", report.policy);
    out.push_str(&format!(
        "{:<12} {:>6} {:>6} {:>5} {:>5} {:>5} {:>5}\n",
        "section", "ticks", "idle", "g0", "g1", "g2", "g3"
    ));
    for s in &report.sections {
        let [g0, g1, g2, g3] = s.grants;
        out.push_str(&format!(
            "{:<12} {:>6} {:>6} {:>5} {:>5} {:>5} {:>5}\n",
            s.name, s.ticks, s.idle_ticks, g0, g1, g2, g3
        ));
    }
    if report.is_clean() {
        out.push_str(&format!("✓ {} ticks, no violations", report.total_ticks()));
    } else {
        out.push_str(&format!("✗ {} violation(s):", report.violations.len()));
        for v in &report.violations {
            out.push_str(&format!("\n  {v}"));
        }
    }
    out
}
