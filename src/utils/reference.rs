use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use std::fs::File;
use std::path::Path;

/// The assembly references used for allele comparison at flagged sites,
/// keyed by record id in file order.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    records: IndexMap<String, String>,
}

impl ReferenceSet {
    /// Load one or more records from a FASTA file, plain or gzip-compressed.
    pub fn from_fasta(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| {
            format!("cannot find reference fasta file at: {}", path.display())
        })?;
        let (reader, _compression) = niffler::get_reader(Box::new(file)).with_context(|| {
            format!("cannot read reference fasta file at: {}", path.display())
        })?;
        let fasta = bio::io::fasta::Reader::new(reader);

        let mut records = IndexMap::new();
        for record in fasta.records() {
            let record = record.with_context(|| {
                format!("cannot parse reference fasta file at: {}", path.display())
            })?;
            let seq = String::from_utf8(record.seq().to_vec()).with_context(|| {
                format!("non-ASCII sequence for record '{}'", record.id())
            })?;
            if records.insert(record.id().to_string(), seq).is_some() {
                bail!("duplicate record id '{}' in {}", record.id(), path.display());
            }
        }
        if records.is_empty() {
            bail!("no records in reference fasta file at: {}", path.display());
        }

        Ok(ReferenceSet { records })
    }

    pub fn from_records(records: impl IntoIterator<Item = (String, String)>) -> Self {
        ReferenceSet {
            records: records.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Allele of `id` at the 1-based `site`, if the record exists and is
    /// long enough.
    pub fn allele_at(&self, id: &str, site: u32) -> Option<char> {
        let idx = (site as usize).checked_sub(1)?;
        self.records
            .get(id)
            .and_then(|seq| seq.as_bytes().get(idx))
            .map(|b| *b as char)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
