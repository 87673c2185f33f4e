pub mod branch_snps;
pub mod convergence;
pub mod figure;
pub mod report;
pub mod reversion;
pub mod states;
pub mod types;

use crate::config::Config;
use crate::export;
use crate::phylo::{branch_paths, Tree};
use crate::utils::reference::ReferenceSet;
use anyhow::{bail, Result};
use self::branch_snps::BranchSnpTable;
use self::figure::FigureStyle;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;

/// Settings for one anomaly-detection run.
#[derive(Debug, Clone)]
pub struct AnomalyOptions {
    pub tree_file: PathBuf,
    pub state_file: PathBuf,
    pub branch_snps: PathBuf,
    pub reference_file: PathBuf,
    pub outdir: PathBuf,
    pub prefix: String,
    pub root_label: String,
    pub figures: bool,
    pub json: bool,
    pub figure_height: Option<u32>,
}

/// Run the full anomaly screen: load the tree, paths, SNP table, references
/// and root state, detect reversions and convergence, then write the CSV
/// reports, the suggested mask and (optionally) figures and a JSON export.
pub fn run(options: &AnomalyOptions, config: &Config) -> Result<()> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );

    progress.set_message("Loading tree and branch paths...");
    let tree = Tree::from_path(&options.tree_file)?;
    let paths = branch_paths(&tree, &options.root_label)?;

    progress.set_message("Reading branch SNP table...");
    let table = BranchSnpTable::read_csv(&options.branch_snps)?;

    progress.set_message("Loading references and root state...");
    let refs = ReferenceSet::from_fasta(&options.reference_file)?;
    let root_seq = states::node_sequence(&options.state_file, &options.root_label)?;
    if root_seq.is_empty() {
        bail!(
            "no states for node '{}' in {}",
            options.root_label,
            options.state_file.display()
        );
    }

    progress.set_message("Scanning for reversions and convergence...");
    let scan = reversion::detect_reversions(&paths, &table, &refs, &root_seq)?;
    let branch_convergence = convergence::detect_convergence(&tree, &table)?;

    fs::create_dir_all(&options.outdir)?;
    let out = |suffix: &str| options.outdir.join(format!("{}.{}", options.prefix, suffix));

    progress.set_message("Writing reports...");
    report::write_convergence_csv(&out("convergence.csv"), &branch_convergence)?;
    report::write_reversions_csv(&out("reversions.csv"), &scan.events)?;
    report::write_mask_csv(&out("suggested_mask.csv"), &scan.branch_reversions)?;

    if options.figures {
        progress.set_message("Rendering annotated tree figures...");
        let style = FigureStyle::from_config(config, options.figure_height, tree.n_tips());
        figure::render_reversion_figure(
            &tree,
            &table,
            &scan,
            &out("reversions_fig.svg"),
            &out("reversions_fig.png"),
            &style,
        )?;
        figure::render_convergence_figure(
            &tree,
            &table,
            &branch_convergence,
            &out("convergence_fig.svg"),
            &out("convergence_fig.png"),
            &style,
        )?;
    }

    if options.json {
        let analysis = export::AnalysisExport::build(&scan, &branch_convergence, paths.len());
        export::write_json(&out("analysis.json"), &analysis)?;
    }

    progress.finish_with_message("Anomaly screen complete");
    println!(
        "{} reversion event(s) and {} branch(es) with convergent SNPs across {} tips",
        scan.events.len(),
        branch_convergence.len(),
        paths.len()
    );

    Ok(())
}
