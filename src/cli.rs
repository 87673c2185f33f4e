use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flag reversions and convergent SNPs in an ancestral reconstruction
    CheckAnomalies {
        /// Newick tree with labelled internal nodes
        tree_file: String,

        /// Ancestral state table (tab-separated node/site/state rows)
        #[arg(long = "states")]
        state_file: String,

        /// Per-branch SNP reconstruction table (parent,child,site,snp,dimer CSV)
        #[arg(long = "branch-snps")]
        branch_snps: String,

        /// Assembly reference FASTA (one or more records)
        #[arg(long = "reference")]
        reference_file: String,

        /// Output directory for reports and figures
        #[arg(short = 'o', long = "outdir", default_value = ".")]
        outdir: String,

        /// Prefix for output file names
        #[arg(long, default_value = "anomalies")]
        prefix: String,

        /// Label of the root node (default from config, normally Node1)
        #[arg(long)]
        root_label: Option<String>,

        /// Skip rendering the annotated tree figures
        #[arg(long)]
        no_figures: bool,

        /// Also write a JSON export of the full analysis
        #[arg(long)]
        json: bool,

        /// Figure height in pixels (default scales with the number of tips)
        #[arg(long)]
        figure_height: Option<u32>,
    },

    /// Print every tip's root-to-tip branch path
    BranchPaths {
        /// Newick tree with labelled internal nodes
        tree_file: String,

        /// Output TSV file (stdout if omitted)
        #[arg(short = 'o', long = "output")]
        output_file: Option<String>,

        /// Label of the root node (default from config, normally Node1)
        #[arg(long)]
        root_label: Option<String>,
    },
}
