use crate::output::{print_json, print_table};
use anyhow::Context;
use chatops_core::commands::{build_registry, BuiltinDeps};
use chatops_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let registry = build_registry(BuiltinDeps::from_config(&config))?;
    let descriptors = registry.descriptors();

    if json {
        return print_json(&descriptors);
    }
    let rows = descriptors
        .into_iter()
        .map(|d| vec![d.name, d.category, d.description])
        .collect();
    print_table(&["COMMAND", "CATEGORY", "DESCRIPTION"], rows);
    Ok(())
}
