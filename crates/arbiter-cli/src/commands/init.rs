use std::path::Path;

use arbiter_core::{RunConfig, SelectionPolicy};

pub fn init(path: &Path, policy: SelectionPolicy, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = RunConfig::scaffold(policy)?;
    std::fs::write(path, config.to_toml_string()?)?;
    println!("✓ Generated {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_scaffold_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbiter.toml");

        init(&path, SelectionPolicy::Credit, false).unwrap();
        let loaded = RunConfig::from_file(&path).unwrap();
        assert_eq!(loaded.policy, SelectionPolicy::Credit);

        assert!(init(&path, SelectionPolicy::Strict, false).is_err());
        init(&path, SelectionPolicy::Strict, true).unwrap();
        assert_eq!(RunConfig::from_file(&path).unwrap().policy, SelectionPolicy::Strict);
    }
}
