use crate::anomaly::{self, AnomalyOptions};
use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(
    tree_file: String,
    state_file: String,
    branch_snps: String,
    reference_file: String,
    outdir: String,
    prefix: String,
    root_label: Option<String>,
    no_figures: bool,
    json: bool,
    figure_height: Option<u32>,
) -> Result<()> {
    let config = Config::load();
    let root_label = root_label.unwrap_or_else(|| config.root_label.clone());

    let options = AnomalyOptions {
        tree_file: PathBuf::from(tree_file),
        state_file: PathBuf::from(state_file),
        branch_snps: PathBuf::from(branch_snps),
        reference_file: PathBuf::from(reference_file),
        outdir: PathBuf::from(outdir),
        prefix,
        root_label,
        figures: !no_figures,
        json,
        figure_height,
    };

    anomaly::run(&options, &config)
}
