use crate::anomaly::types::{BranchConvergence, ReversionEvent, SiteAllele};
use crate::phylo::BranchId;
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column order of the reversion report.
pub const REVERSION_FIELDS: [&str; 10] = [
    "taxon",
    "site",
    "original_snp",
    "original_branch",
    "dinucleotide_context",
    "reversion_snp",
    "reference_alleles",
    "root_allele",
    "reversion_to",
    "reversion_branch",
];

pub fn write_convergence_csv(path: &Path, branch_convergence: &BranchConvergence) -> Result<()> {
    let mut writer = create(path)?;
    writeln!(writer, "branch,snp")?;
    for (branch, snps) in branch_convergence {
        for snp in snps {
            writeln!(writer, "{},{}", branch, snp)?;
        }
    }
    Ok(())
}

pub fn write_reversions_csv(path: &Path, events: &[ReversionEvent]) -> Result<()> {
    let mut writer = create(path)?;
    writeln!(writer, "{}", REVERSION_FIELDS.join(","))?;
    for event in events {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{}",
            event.taxon,
            event.site,
            event.original_snp,
            event.original_branch,
            event.dinucleotide_context,
            event.reversion_snp,
            event.reference_alleles,
            event.root_allele,
            event.reversion_to,
            event.reversion_branch,
        )?;
    }
    Ok(())
}

/// One length-1 mask interval per flagged site-allele pair per reverting
/// branch, for the downstream masking step.
pub fn write_mask_csv(
    path: &Path,
    branch_reversions: &IndexMap<BranchId, IndexSet<SiteAllele>>,
) -> Result<()> {
    let mut writer = create(path)?;
    writeln!(writer, "Name,Minimum,Maximum,Length")?;
    for (branch, alleles) in branch_reversions {
        for site_allele in alleles {
            writeln!(
                writer,
                "{} reversion to {},{},{},1",
                branch, site_allele.allele, site_allele.site, site_allele.site,
            )?;
        }
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
