use crate::anomaly::branch_snps::BranchSnpTable;
use crate::anomaly::types::BranchConvergence;
use crate::phylo::{BranchId, Tree};
use anyhow::{bail, Result};
use indexmap::{IndexMap, IndexSet};

/// Scan every branch of the tree and flag SNPs that occur on more than one
/// branch, anywhere in the tree.
///
/// Occurrences are keyed by (site, snp descriptor). Branches on a shared
/// lineage are not excluded, so a reversion pair also shows up here; see
/// DESIGN.md before changing that.
pub fn detect_convergence(tree: &Tree, table: &BranchSnpTable) -> Result<BranchConvergence> {
    let mut occurrences: IndexMap<(String, String), IndexSet<BranchId>> = IndexMap::new();

    for branch in tree.branches() {
        if branch.parent.is_empty() || branch.child.is_empty() {
            continue;
        }
        for record in table.snps(&branch) {
            occurrences
                .entry((record.site.clone(), record.snp.clone()))
                .or_default()
                .insert(branch.clone());
        }
    }

    let mut branch_convergence = BranchConvergence::new();
    let mut convergent_snps = Vec::new();
    for ((site, snp), branches) in &occurrences {
        if branches.len() < 2 {
            continue;
        }
        let (from, to) = match (snp.chars().next(), snp.chars().last()) {
            (Some(f), Some(t)) => (f, t),
            _ => bail!("empty SNP descriptor at site {}", site),
        };
        let report = format!("{}{}{}", from, site, to);
        convergent_snps.push(report.clone());
        for branch in branches {
            branch_convergence
                .entry(branch.clone())
                .or_default()
                .insert(report.clone());
        }
    }

    if !convergent_snps.is_empty() {
        println!("Convergent snps flagged:");
        for snp in &convergent_snps {
            println!("- {}", snp);
        }
    }

    Ok(branch_convergence)
}
