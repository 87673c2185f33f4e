use phyloqc_tools::anomaly::{self, AnomalyOptions};
use phyloqc_tools::config::Config;
use phyloqc_tools::export::AnalysisExport;
use std::fs;
use std::io::Write;
use std::path::Path;

fn write_inputs(dir: &Path) {
    fs::write(dir.join("run.treefile"), "((A:1,B:1)Node2:1)Node1;\n").expect("tree");

    let mut states = fs::File::create(dir.join("run.state")).expect("states");
    writeln!(states, "# ancestral reconstruction").expect("write");
    writeln!(states, "Node\tSite\tState\tp_A\tp_C\tp_G\tp_T").expect("write");
    for site in 1..=60 {
        writeln!(states, "Node1\t{}\tA\t1\t0\t0\t0", site).expect("write");
    }
    drop(states);

    fs::write(
        dir.join("branch_snps.csv"),
        "parent,child,site,snp,dimer\n\
         Node1,Node2,50,A->G,AG\n\
         Node2,A,50,G->A,GA\n",
    )
    .expect("snps");

    let reference = format!(">NC_demo\n{}A{}\n", "N".repeat(49), "N".repeat(10));
    fs::write(dir.join("reference.fasta"), reference).expect("reference");
}

#[test]
fn full_run_writes_all_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_inputs(dir.path());
    let outdir = dir.path().join("out");

    let options = AnomalyOptions {
        tree_file: dir.path().join("run.treefile"),
        state_file: dir.path().join("run.state"),
        branch_snps: dir.path().join("branch_snps.csv"),
        reference_file: dir.path().join("reference.fasta"),
        outdir: outdir.clone(),
        prefix: "anomalies".to_string(),
        root_label: "Node1".to_string(),
        figures: true,
        json: true,
        figure_height: None,
    };

    anomaly::run(&options, &Config::default()).expect("run");

    let reversions = fs::read_to_string(outdir.join("anomalies.reversions.csv")).expect("csv");
    let lines: Vec<&str> = reversions.lines().collect();
    assert_eq!(lines.len(), 2);
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[0], "A");
    assert_eq!(fields[1], "50");
    assert_eq!(fields[3], "Node1_Node2");
    assert_eq!(fields[5], "G->A");
    assert_eq!(fields[9], "Node2_A");

    // A->G and G->A are different SNPs, so nothing converges here.
    let convergence = fs::read_to_string(outdir.join("anomalies.convergence.csv")).expect("csv");
    assert_eq!(convergence.trim(), "branch,snp");

    let mask = fs::read_to_string(outdir.join("anomalies.suggested_mask.csv")).expect("csv");
    let mask_lines: Vec<&str> = mask.lines().collect();
    assert_eq!(mask_lines[0], "Name,Minimum,Maximum,Length");
    assert_eq!(mask_lines[1], "Node2_A reversion to A,50,50,1");

    let svg = fs::read_to_string(outdir.join("anomalies.reversions_fig.svg")).expect("svg");
    assert!(svg.contains("<svg"));
    assert!(svg.contains("50A"));
    let png = fs::metadata(outdir.join("anomalies.reversions_fig.png")).expect("png");
    assert!(png.len() > 0);
    assert!(outdir.join("anomalies.convergence_fig.svg").exists());
    assert!(outdir.join("anomalies.convergence_fig.png").exists());

    let json = fs::read_to_string(outdir.join("anomalies.analysis.json")).expect("json");
    let export: AnalysisExport = serde_json::from_str(&json).expect("parse export");
    assert_eq!(export.summary.tips, 2);
    assert_eq!(export.summary.reversion_events, 1);
    assert_eq!(export.reversions[0].taxon, "A");
    assert_eq!(export.reversions[0].reversion_branch, "Node2_A");
}

#[test]
fn missing_reference_fails_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_inputs(dir.path());

    let options = AnomalyOptions {
        tree_file: dir.path().join("run.treefile"),
        state_file: dir.path().join("run.state"),
        branch_snps: dir.path().join("branch_snps.csv"),
        reference_file: dir.path().join("absent.fasta"),
        outdir: dir.path().join("out"),
        prefix: "anomalies".to_string(),
        root_label: "Node1".to_string(),
        figures: false,
        json: false,
        figure_height: None,
    };

    let err = anomaly::run(&options, &Config::default()).expect_err("must fail");
    assert!(err.to_string().contains("reference fasta"));
}
