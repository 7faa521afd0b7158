use arbiter_core::RunConfig;
use arbiter_sim::run_random_trials;

use crate::Format;

pub fn run(config: &RunConfig, format: Format) -> anyhow::Result<()> {
    let mut tb = super::prepare(config)?;
    run_random_trials(&mut tb, &config.stimulus)?;
    super::finish(tb.report(), format)
}
