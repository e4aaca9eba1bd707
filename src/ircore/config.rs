use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::ircore::dictionary::DEFAULT_TABLE_SIZE;
use crate::ircore::{Result, CFG_NAME};

/// Engine settings, read from YAML. Every field is optional in the file.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub index_dir: PathBuf,
    pub table_size: u64,
    pub kgram_k: usize,
    pub jaccard_threshold: f64,
    pub max_edit_distance: usize,
    pub combination_scale: f64,
    pub hits_max_iterations: usize,
    pub hits_epsilon: f64,
    pub hits_time_budget_ms: Option<u64>,
    pub feedback_alpha: f64,
    pub links_file: Option<PathBuf>,
    pub titles_file: Option<PathBuf>,
    pub pagerank_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            index_dir: PathBuf::from(".pir/index"),
            table_size: DEFAULT_TABLE_SIZE,
            kgram_k: 2,
            jaccard_threshold: 0.4,
            max_edit_distance: 2,
            combination_scale: 1000.0,
            hits_max_iterations: 1000,
            hits_epsilon: 0.001,
            hits_time_budget_ms: None,
            feedback_alpha: 0.2,
            links_file: None,
            titles_file: None,
            pagerank_file: None,
        }
    }
}

impl EngineConfig {
    pub fn from_str(cfg: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(cfg)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let cfg_str = fs::read_to_string(path)?;
        Self::from_str(&cfg_str)
    }

    /// Reads `<index_dir>/.pircfg` when present, defaults otherwise.
    pub fn load_or_default(index_dir: &Path) -> Result<Self> {
        let cfg_path = index_dir.join(CFG_NAME);
        let mut cfg = if cfg_path.is_file() {
            log::debug!("reading config {}", cfg_path.display());
            Self::load(&cfg_path)?
        } else {
            EngineConfig::default()
        };
        cfg.index_dir = index_dir.to_path_buf();
        Ok(cfg)
    }

    pub fn hits_time_budget(&self) -> Option<Duration> {
        self.hits_time_budget_ms.map(Duration::from_millis)
    }
}
