use crate::phylo::BranchId;
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// One reconstructed substitution on a branch: the site, snp and dimer
/// columns of the branch SNP table, kept exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnpRecord {
    /// 1-based genomic site, as written in the table.
    pub site: String,
    /// Substitution descriptor in "X->Y" form.
    pub snp: String,
    /// Dinucleotide context of the site.
    pub dimer: String,
}

impl SnpRecord {
    pub fn new(site: impl Into<String>, snp: impl Into<String>, dimer: impl Into<String>) -> Self {
        SnpRecord {
            site: site.into(),
            snp: snp.into(),
            dimer: dimer.into(),
        }
    }

    /// Numeric value of the site column.
    pub fn site_pos(&self) -> Result<u32> {
        self.site
            .parse()
            .with_context(|| format!("invalid site '{}' in branch SNP table", self.site))
    }

    /// The allele the substitution moves away from (first descriptor character).
    pub fn from_allele(&self) -> Option<char> {
        self.snp.chars().next()
    }

    /// The allele the substitution arrives at (last descriptor character).
    pub fn to_allele(&self) -> Option<char> {
        self.snp.chars().last()
    }
}

/// A site paired with one allele, reported as `"{site}{allele}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteAllele {
    pub site: u32,
    pub allele: char,
}

impl fmt::Display for SiteAllele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.site, self.allele)
    }
}

/// One detected reversion on a tip's root-to-tip path.
#[derive(Debug, Clone)]
pub struct ReversionEvent {
    pub taxon: String,
    pub site: String,
    pub original_snp: String,
    pub original_branch: BranchId,
    pub dinucleotide_context: String,
    pub reversion_snp: String,
    /// Semicolon-joined `reference_id:allele` pairs at the site.
    pub reference_alleles: String,
    pub root_allele: char,
    /// Semicolon-joined names of the references (and/or "Root") whose allele
    /// matches the reverted-to allele.
    pub reversion_to: String,
    pub reversion_branch: BranchId,
}

/// Everything the reversion scan produces.
#[derive(Debug, Default)]
pub struct ReversionScan {
    pub events: Vec<ReversionEvent>,
    /// Per reverting branch, the reverted-to site/allele pairs on it.
    pub branch_reversions: IndexMap<BranchId, IndexSet<SiteAllele>>,
    /// Per originating branch, the site/allele pairs later reverted elsewhere.
    pub reverted_origins: IndexMap<BranchId, IndexSet<SiteAllele>>,
}

/// Convergent SNP report strings per branch.
pub type BranchConvergence = IndexMap<BranchId, IndexSet<String>>;
