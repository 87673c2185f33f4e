use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;

/// Tool configuration, read from `config.toml` under the platform config
/// directory when present. Every field falls back to a default, so a missing
/// or stale file never fails a run.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Label of the root node in the tree and the ancestral state table.
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// Figure width in pixels.
    #[serde(default = "default_figure_width")]
    pub figure_width: u32,
    /// Vertical pixels allotted per tip when sizing figures.
    #[serde(default = "default_row_height")]
    pub figure_row_height: u32,
    /// Dot color for deamination-signature SNPs.
    #[serde(default = "default_signature_color")]
    pub signature_color: String,
    /// Dot color for all other SNPs.
    #[serde(default = "default_snp_color")]
    pub snp_color: String,
}

fn default_root_label() -> String {
    "Node1".to_string()
}

fn default_figure_width() -> u32 {
    1600
}

fn default_row_height() -> u32 {
    28
}

fn default_signature_color() -> String {
    "#995e62".to_string()
}

fn default_snp_color() -> String {
    "#d9b660".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
            figure_width: default_figure_width(),
            figure_row_height: default_row_height(),
            signature_color: default_signature_color(),
            snp_color: default_snp_color(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("org", "phyloqc", "phyloqc-tools") {
            let config_path = proj_dirs.config_dir().join("config.toml");

            if config_path.exists() {
                if let Ok(content) = fs::read_to_string(config_path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Config::default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("org", "phyloqc", "phyloqc-tools") {
            let config_dir = proj_dirs.config_dir();
            fs::create_dir_all(config_dir)?;

            let content = toml::to_string_pretty(self)?;
            fs::write(config_dir.join("config.toml"), content)?;
        }
        Ok(())
    }
}
