use std::path::{Path, PathBuf};

pub const CHATOPS_DIR: &str = ".chatops";
pub const CONFIG_FILE: &str = ".chatops/config.yaml";

pub fn chatops_dir(root: &Path) -> PathBuf {
    root.join(CHATOPS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}
