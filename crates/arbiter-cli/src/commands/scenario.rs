use arbiter_core::RunConfig;
use arbiter_sim::Scenario;

use crate::{Format, Which};

pub fn run(config: &RunConfig, which: Which, format: Format) -> anyhow::Result<()> {
    let scenarios: &[Scenario] = match which {
        Which::Equal => &[Scenario::EqualWeights],
        Which::Weighted => &[Scenario::Weighted],
        Which::All => &Scenario::ALL,
    };

    let mut tb = super::prepare(config)?;
    for scenario in scenarios {
        scenario.run(&mut tb)?;
    }
    super::finish(tb.report(), format)
}
