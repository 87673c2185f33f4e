use crate::anomaly::branch_snps::BranchSnpTable;
use crate::anomaly::types::{ReversionEvent, ReversionScan, SiteAllele, SnpRecord};
use crate::phylo::BranchId;
use crate::utils::reference::ReferenceSet;
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Walk every tip's root→tip path and flag SNPs that return a site to an
/// allele already established earlier on the same path.
///
/// Original-branch policy: the site→branch map is shared across tips and
/// overwritten on every record, so `original_branch` is the most recent
/// prior branch that introduced a SNP at the site. For a third occurrence of
/// a site that means the second occurrence's branch, while `original_snp`
/// and the dinucleotide context always come from the first record at the
/// site in the accumulated path list. Most-recent-prior-occurrence wins is
/// the policy here, not an accident of iteration order.
pub fn detect_reversions(
    branch_paths: &IndexMap<String, Vec<BranchId>>,
    table: &BranchSnpTable,
    refs: &ReferenceSet,
    root_seq: &str,
) -> Result<ReversionScan> {
    let mut scan = ReversionScan::default();
    let mut site_to_branch: HashMap<String, BranchId> = HashMap::new();

    for (tip, path) in branch_paths {
        let mut path_snps: Vec<&SnpRecord> = Vec::new();
        for branch in path {
            for record in table.snps(branch) {
                if let Some(original) = path_snps.iter().find(|seen| seen.site == record.site) {
                    let site = record.site_pos()?;
                    let (introduced, allele) = match (record.from_allele(), record.to_allele()) {
                        (Some(f), Some(t)) => (f, t),
                        _ => bail!("empty SNP descriptor on branch {}", branch),
                    };
                    let origin = site_to_branch
                        .get(&record.site)
                        .cloned()
                        .with_context(|| {
                            format!("no originating branch recorded for site {}", record.site)
                        })?;

                    scan.branch_reversions
                        .entry(branch.clone())
                        .or_default()
                        .insert(SiteAllele { site, allele });
                    scan.reverted_origins
                        .entry(origin.clone())
                        .or_default()
                        .insert(SiteAllele {
                            site,
                            allele: introduced,
                        });

                    let mut reference_alleles = Vec::new();
                    let mut reversion_to = Vec::new();
                    for id in refs.ids() {
                        let var = refs.allele_at(id, site).with_context(|| {
                            format!("site {} is beyond the end of reference '{}'", site, id)
                        })?;
                        reference_alleles.push(format!("{}:{}", id, var));
                        if allele == var {
                            reversion_to.push(id.to_string());
                        }
                    }
                    let root_allele = (site as usize)
                        .checked_sub(1)
                        .and_then(|idx| root_seq.as_bytes().get(idx))
                        .map(|b| *b as char)
                        .with_context(|| {
                            format!(
                                "site {} is beyond the end of the root sequence ({} bases)",
                                site,
                                root_seq.len()
                            )
                        })?;
                    if allele == root_allele {
                        reversion_to.push("Root".to_string());
                    }

                    scan.events.push(ReversionEvent {
                        taxon: tip.clone(),
                        site: record.site.clone(),
                        original_snp: original.snp.clone(),
                        original_branch: origin,
                        dinucleotide_context: original.dimer.clone(),
                        reversion_snp: record.snp.clone(),
                        reference_alleles: reference_alleles.join(";"),
                        root_allele,
                        reversion_to: reversion_to.join(";"),
                        reversion_branch: branch.clone(),
                    });
                }

                site_to_branch.insert(record.site.clone(), branch.clone());
                path_snps.push(record);
            }
        }
    }

    if !scan.branch_reversions.is_empty() {
        println!("Reversions flagged:");
        for (branch, alleles) in &scan.branch_reversions {
            let listed: Vec<String> = alleles.iter().map(|a| a.to_string()).collect();
            println!("- {} {{{}}}", branch, listed.join(", "));
        }
    }

    Ok(scan)
}
