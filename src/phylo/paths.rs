use crate::phylo::Tree;
use anyhow::{bail, Result};
use indexmap::IndexMap;
use std::fmt;

/// Identity of a tree edge: the (parent label, child label) pair.
///
/// Used as the key everywhere a branch is referenced, instead of a formatted
/// `"parent_child"` string. The underscore form only appears in output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchId {
    pub parent: String,
    pub child: String,
}

impl BranchId {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        BranchId {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.parent, self.child)
    }
}

/// For every tip, the ordered branches from the root down to that tip.
///
/// Walks parent links upward from each tip, collecting node labels until
/// `root_label` is reached (inclusive), then reverses into root→tip order
/// and pairs consecutive labels into branches. A parent chain that ends
/// before `root_label` is a malformed tree and fails the run outright.
pub fn branch_paths(tree: &Tree, root_label: &str) -> Result<IndexMap<String, Vec<BranchId>>> {
    let mut paths = IndexMap::new();

    for tip in tree.tips() {
        let tip_label = tree.node(tip).label.clone();
        if tip_label.is_empty() {
            bail!("tree contains an unnamed tip");
        }

        let mut labels = vec![tip_label.clone()];
        let mut current = tip;
        loop {
            let node = tree.node(current);
            let parent = match node.parent {
                Some(p) => p,
                None => bail!(
                    "tip '{}': reached '{}' without finding root '{}'",
                    tip_label,
                    node.label,
                    root_label
                ),
            };
            let parent_label = tree.node(parent).label.as_str();
            if parent_label.is_empty() {
                bail!(
                    "tip '{}': unlabelled internal node on the path to the root",
                    tip_label
                );
            }
            labels.push(parent_label.to_string());
            if parent_label == root_label {
                break;
            }
            current = parent;
        }

        labels.reverse();
        let branches = labels
            .windows(2)
            .map(|pair| BranchId::new(pair[0].clone(), pair[1].clone()))
            .collect();
        paths.insert(tip_label, branches);
    }

    Ok(paths)
}
