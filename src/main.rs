use clap::Parser;
use phyloqc_tools::cli;
use phyloqc_tools::commands;

fn main() {
    let args = cli::Args::parse();

    let result = match args.command {
        cli::Commands::CheckAnomalies {
            tree_file,
            state_file,
            branch_snps,
            reference_file,
            outdir,
            prefix,
            root_label,
            no_figures,
            json,
            figure_height,
        } => commands::check_anomalies::run(
            tree_file,
            state_file,
            branch_snps,
            reference_file,
            outdir,
            prefix,
            root_label,
            no_figures,
            json,
            figure_height,
        ),
        cli::Commands::BranchPaths {
            tree_file,
            output_file,
            root_label,
        } => commands::branch_paths::run(tree_file, output_file, root_label),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
