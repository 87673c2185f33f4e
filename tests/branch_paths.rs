use phyloqc_tools::phylo::{branch_paths, BranchId, Tree};

fn example_tree() -> Tree {
    Tree::from_newick("((A:1,B:1)Node2:1,C:2)Node1;").expect("parse tree")
}

#[test]
fn path_length_matches_depth() {
    let tree = example_tree();
    let paths = branch_paths(&tree, "Node1").expect("paths");

    assert_eq!(paths.len(), 3);
    assert_eq!(paths["A"].len(), 2);
    assert_eq!(paths["B"].len(), 2);
    assert_eq!(paths["C"].len(), 1);
}

#[test]
fn paths_read_root_to_tip() {
    let tree = example_tree();
    let paths = branch_paths(&tree, "Node1").expect("paths");

    let a = &paths["A"];
    assert_eq!(
        a,
        &vec![
            BranchId::new("Node1", "Node2"),
            BranchId::new("Node2", "A"),
        ]
    );
    assert_eq!(a.first().expect("nonempty").parent, "Node1");
    assert_eq!(a.last().expect("nonempty").child, "A");

    let c = &paths["C"];
    assert_eq!(c, &vec![BranchId::new("Node1", "C")]);
}

#[test]
fn every_path_branch_is_a_tree_branch() {
    let tree = example_tree();
    let paths = branch_paths(&tree, "Node1").expect("paths");
    let tree_branches: Vec<BranchId> = tree.branches().collect();

    for path in paths.values() {
        for branch in path {
            assert!(tree_branches.contains(branch), "unknown branch {}", branch);
        }
    }
}

#[test]
fn unreachable_root_is_fatal() {
    let tree = example_tree();
    let err = branch_paths(&tree, "Node99").expect_err("must fail");
    assert!(
        err.to_string().contains("without finding root"),
        "unexpected message: {}",
        err
    );
}
