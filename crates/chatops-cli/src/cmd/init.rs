use anyhow::Context;
use chatops_core::config::Config;
use chatops_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, bot_name: Option<&str>) -> anyhow::Result<()> {
    let bot_name = bot_name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chatops".to_string())
    });

    println!("Initializing chatops in: {}", root.display());

    let config = Config::new(bot_name);
    let data = serde_yaml::to_string(&config).context("failed to render config")?;
    let path = paths::config_path(root);
    let created = io::write_if_missing(&path, data.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    Ok(())
}
