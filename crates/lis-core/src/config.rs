//! Pipeline configuration file.
//!
//! Only paths and scheduling are configurable. Business rules are fixed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for source workbooks.
    pub input_dir: Option<PathBuf>,
    /// Where processed workbooks and the batch report go. Defaults to the
    /// input directory.
    pub output_dir: Option<PathBuf>,
    /// Consolidated workbook written by the merge phase.
    pub merged_output: Option<PathBuf>,
    /// Worker threads for the batch phase; 0 lets rayon decide.
    pub workers: usize,
    /// Leave inputs alone when their processed workbook already exists.
    pub skip_existing: bool,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Output directory for processed workbooks given the input directory.
    pub fn resolved_output_dir(&self, input_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| input_dir.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: PipelineConfig = toml::from_str("workers = 4\n").expect("parse");
        assert_eq!(config.workers, 4);
        assert!(!config.skip_existing);
        assert_eq!(config.input_dir, None);
    }

    #[test]
    fn output_dir_falls_back_to_input() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.resolved_output_dir(Path::new("/data/in")),
            PathBuf::from("/data/in")
        );
        let config: PipelineConfig =
            toml::from_str("output_dir = \"/data/out\"\nskip_existing = true\n").expect("parse");
        assert_eq!(
            config.resolved_output_dir(Path::new("/data/in")),
            PathBuf::from("/data/out")
        );
        assert!(config.skip_existing);
    }
}
