use phyloqc_tools::anomaly::branch_snps::BranchSnpTable;
use phyloqc_tools::anomaly::convergence::detect_convergence;
use phyloqc_tools::anomaly::types::SnpRecord;
use phyloqc_tools::phylo::{BranchId, Tree};

fn two_lineage_tree() -> Tree {
    Tree::from_newick("(((C1:1)Node3:1)Node2:1,(tipA:1)Node5:1)Node1;").expect("parse tree")
}

#[test]
fn unrelated_branches_sharing_a_snp_are_flagged() {
    let tree = two_lineage_tree();

    let mut table = BranchSnpTable::default();
    table.push(
        BranchId::new("Node2", "Node3"),
        SnpRecord::new("200", "C->T", "TC"),
    );
    table.push(
        BranchId::new("Node5", "tipA"),
        SnpRecord::new("200", "C->T", "TC"),
    );

    let convergence = detect_convergence(&tree, &table).expect("convergence");

    let left = &convergence[&BranchId::new("Node2", "Node3")];
    assert_eq!(left.len(), 1);
    assert!(left.contains("C200T"));
    let right = &convergence[&BranchId::new("Node5", "tipA")];
    assert_eq!(right.len(), 1);
    assert!(right.contains("C200T"));
}

#[test]
fn singleton_snp_is_never_reported() {
    let tree = two_lineage_tree();

    let mut table = BranchSnpTable::default();
    table.push(
        BranchId::new("Node2", "Node3"),
        SnpRecord::new("200", "C->T", "TC"),
    );
    table.push(
        BranchId::new("Node5", "tipA"),
        SnpRecord::new("300", "C->T", "TC"),
    );

    let convergence = detect_convergence(&tree, &table).expect("convergence");
    assert!(convergence.is_empty());
}

#[test]
fn repeats_on_one_branch_are_not_convergence() {
    let tree = two_lineage_tree();

    let mut table = BranchSnpTable::default();
    table.push(
        BranchId::new("Node2", "Node3"),
        SnpRecord::new("200", "C->T", "TC"),
    );
    table.push(
        BranchId::new("Node2", "Node3"),
        SnpRecord::new("200", "C->T", "TC"),
    );

    let convergence = detect_convergence(&tree, &table).expect("convergence");
    assert!(convergence.is_empty());
}

#[test]
fn shared_lineage_recurrence_is_still_flagged() {
    // The scan does not exclude ancestor-descendant pairs, so a site that
    // mutates the same way twice down one lineage shows up here too.
    let tree = two_lineage_tree();

    let mut table = BranchSnpTable::default();
    table.push(
        BranchId::new("Node1", "Node2"),
        SnpRecord::new("400", "A->G", "AG"),
    );
    table.push(
        BranchId::new("Node2", "Node3"),
        SnpRecord::new("400", "A->G", "AG"),
    );

    let convergence = detect_convergence(&tree, &table).expect("convergence");
    assert_eq!(convergence.len(), 2);
    assert!(convergence[&BranchId::new("Node1", "Node2")].contains("A400G"));
    assert!(convergence[&BranchId::new("Node2", "Node3")].contains("A400G"));
}
