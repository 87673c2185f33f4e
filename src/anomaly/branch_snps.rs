use crate::anomaly::types::SnpRecord;
use crate::phylo::BranchId;
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const EXPECTED_HEADER: [&str; 5] = ["parent", "child", "site", "snp", "dimer"];

/// The per-branch SNP table produced by the reconstruction step, grouped by
/// branch identity in input row order.
#[derive(Debug, Default)]
pub struct BranchSnpTable {
    records: IndexMap<BranchId, Vec<SnpRecord>>,
}

impl BranchSnpTable {
    /// Read a `parent,child,site,snp,dimer` CSV, plain or gzip-compressed.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open branch SNP table at: {}", path.display()))?;
        let (reader, _compression) = niffler::get_reader(Box::new(file))
            .with_context(|| format!("cannot read branch SNP table at: {}", path.display()))?;
        let reader = BufReader::new(reader);

        let mut table = BranchSnpTable::default();
        let mut lines = reader.lines().enumerate();

        let header = match lines.next() {
            Some((_, line)) => {
                line.with_context(|| format!("cannot read {}", path.display()))?
            }
            None => bail!("branch SNP table is empty: {}", path.display()),
        };
        let header_fields: Vec<&str> = header.trim().split(',').collect();
        if header_fields != EXPECTED_HEADER {
            bail!(
                "unexpected header '{}' in {} (expected '{}')",
                header.trim(),
                path.display(),
                EXPECTED_HEADER.join(",")
            );
        }

        for (idx, line) in lines {
            let line = line.with_context(|| format!("cannot read {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != EXPECTED_HEADER.len() {
                bail!(
                    "malformed row at line {} of {}: expected {} fields, found {}",
                    idx + 1,
                    path.display(),
                    EXPECTED_HEADER.len(),
                    fields.len()
                );
            }
            table.push(
                BranchId::new(fields[0], fields[1]),
                SnpRecord::new(fields[2], fields[3], fields[4]),
            );
        }

        Ok(table)
    }

    pub fn push(&mut self, branch: BranchId, record: SnpRecord) {
        self.records.entry(branch).or_default().push(record);
    }

    /// SNPs on `branch`, in table row order; empty if the branch has none.
    pub fn snps(&self, branch: &BranchId) -> &[SnpRecord] {
        self.records
            .get(branch)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Branches present in the table, in first-row order.
    pub fn branches(&self) -> impl Iterator<Item = &BranchId> {
        self.records.keys()
    }

    pub fn n_records(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}
