use phyloqc_tools::anomaly::branch_snps::BranchSnpTable;
use phyloqc_tools::anomaly::states::node_sequence;
use phyloqc_tools::phylo::{BranchId, Tree};
use phyloqc_tools::utils::reference::ReferenceSet;
use std::fs;
use std::io::Write;

#[test]
fn newick_keeps_internal_labels_and_order() {
    let tree = Tree::from_newick("((A:0.1,B:0.2)Node2:0.3,C:0.4)Node1;").expect("parse");

    assert_eq!(tree.node(tree.root()).label, "Node1");
    assert_eq!(tree.n_tips(), 3);
    let tips: Vec<&str> = tree.tips().map(|id| tree.node(id).label.as_str()).collect();
    assert_eq!(tips, vec!["A", "B", "C"]);

    let branches: Vec<String> = tree.branches().map(|b| b.to_string()).collect();
    assert_eq!(
        branches,
        vec!["Node1_Node2", "Node2_A", "Node2_B", "Node1_C"]
    );
}

#[test]
fn branch_snp_table_groups_rows_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("branch_snps.csv");
    fs::write(
        &path,
        "parent,child,site,snp,dimer\n\
         Node1,Node2,50,A->G,AG\n\
         Node1,Node2,90,C->T,TC\n\
         Node2,A,50,G->A,GA\n",
    )
    .expect("write");

    let table = BranchSnpTable::read_csv(&path).expect("read");
    assert_eq!(table.n_records(), 3);

    let node2 = table.snps(&BranchId::new("Node1", "Node2"));
    assert_eq!(node2.len(), 2);
    assert_eq!(node2[0].site, "50");
    assert_eq!(node2[0].snp, "A->G");
    assert_eq!(node2[1].site, "90");

    // Absent branches are an empty list, not an error.
    assert!(table.snps(&BranchId::new("Node2", "B")).is_empty());
}

#[test]
fn branch_snp_table_rejects_bad_input() {
    let dir = tempfile::tempdir().expect("tempdir");

    let wrong_header = dir.path().join("header.csv");
    fs::write(&wrong_header, "a,b,c,d,e\nNode1,Node2,50,A->G,AG\n").expect("write");
    let err = BranchSnpTable::read_csv(&wrong_header).expect_err("must fail");
    assert!(err.to_string().contains("unexpected header"));

    let short_row = dir.path().join("short.csv");
    fs::write(&short_row, "parent,child,site,snp,dimer\nNode1,Node2,50\n").expect("write");
    let err = BranchSnpTable::read_csv(&short_row).expect_err("must fail");
    assert!(err.to_string().contains("malformed row at line 2"));
}

#[test]
fn node_sequence_concatenates_matching_states() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ancestral.state");
    let mut file = fs::File::create(&path).expect("create");
    writeln!(file, "# comment line").expect("write");
    writeln!(file, "Node\tSite\tState\tp_A\tp_C\tp_G\tp_T").expect("write");
    for (site, state) in [(1, 'A'), (2, 'C'), (3, 'G')] {
        writeln!(file, "Node1\t{}\t{}\t1\t0\t0\t0", site, state).expect("write");
        writeln!(file, "Node2\t{}\tT\t0\t0\t0\t1", site).expect("write");
    }
    drop(file);

    assert_eq!(node_sequence(&path, "Node1").expect("parse"), "ACG");
    assert_eq!(node_sequence(&path, "Node2").expect("parse"), "TTT");
}

#[test]
fn node_sequence_stops_early_on_malformed_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ancestral.state");
    fs::write(
        &path,
        "Node1\t1\tA\t1\t0\t0\t0\n\
         Node1\t2\tC\t1\t0\t0\t0\n\
         truncated row\n\
         Node1\t3\tG\t1\t0\t0\t0\n",
    )
    .expect("write");

    // The malformed row stops parsing; the trailing good row is never seen.
    assert_eq!(node_sequence(&path, "Node1").expect("parse"), "AC");
}

#[test]
fn reference_fasta_loads_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("refs.fasta");
    fs::write(&path, ">ref1\nACGT\n>ref2\nGGGG\n").expect("write");

    let refs = ReferenceSet::from_fasta(&path).expect("load");
    assert_eq!(refs.len(), 2);
    let ids: Vec<&str> = refs.ids().collect();
    assert_eq!(ids, vec!["ref1", "ref2"]);
    assert_eq!(refs.allele_at("ref1", 1), Some('A'));
    assert_eq!(refs.allele_at("ref1", 4), Some('T'));
    assert_eq!(refs.allele_at("ref1", 5), None);
    assert_eq!(refs.allele_at("missing", 1), None);
}

#[test]
fn missing_reference_fasta_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = ReferenceSet::from_fasta(&dir.path().join("nope.fasta")).expect_err("must fail");
    assert!(err.to_string().contains("cannot find reference fasta"));
}
