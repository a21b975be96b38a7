use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the database location, preferring an explicit `--db` path over
    /// the per-user data directory.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        if let Some(db_path) = db_override {
            return Ok(Config { db_path });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "foodbase").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("usda.db"),
        })
    }
}
