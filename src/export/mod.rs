use crate::anomaly::types::{BranchConvergence, ReversionScan};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub const EXPORT_VERSION: &str = "1";

/// Root structure for the JSON analysis export.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisExport {
    pub version: String,
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime"
    )]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,
    pub summary: AnomalySummary,
    pub reversions: Vec<ReversionRow>,
    pub convergence: Vec<ConvergenceRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub tips: usize,
    pub reversion_events: usize,
    pub reverting_branches: usize,
    pub convergent_branches: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReversionRow {
    pub taxon: String,
    pub site: String,
    pub original_snp: String,
    pub original_branch: String,
    pub dinucleotide_context: String,
    pub reversion_snp: String,
    pub reference_alleles: String,
    pub root_allele: char,
    pub reversion_to: String,
    pub reversion_branch: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvergenceRow {
    pub branch: String,
    pub snps: Vec<String>,
}

impl AnalysisExport {
    pub fn build(scan: &ReversionScan, convergence: &BranchConvergence, tips: usize) -> Self {
        let reversions = scan
            .events
            .iter()
            .map(|event| ReversionRow {
                taxon: event.taxon.clone(),
                site: event.site.clone(),
                original_snp: event.original_snp.clone(),
                original_branch: event.original_branch.to_string(),
                dinucleotide_context: event.dinucleotide_context.clone(),
                reversion_snp: event.reversion_snp.clone(),
                reference_alleles: event.reference_alleles.clone(),
                root_allele: event.root_allele,
                reversion_to: event.reversion_to.clone(),
                reversion_branch: event.reversion_branch.to_string(),
            })
            .collect();
        let convergence_rows = convergence
            .iter()
            .map(|(branch, snps)| ConvergenceRow {
                branch: branch.to_string(),
                snps: snps.iter().cloned().collect(),
            })
            .collect();

        AnalysisExport {
            version: EXPORT_VERSION.to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            summary: AnomalySummary {
                tips,
                reversion_events: scan.events.len(),
                reverting_branches: scan.branch_reversions.len(),
                convergent_branches: convergence.len(),
            },
            reversions,
            convergence: convergence_rows,
        }
    }
}

pub fn write_json(path: &Path, export: &AnalysisExport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), export)
        .with_context(|| format!("cannot serialize analysis export to {}", path.display()))?;
    Ok(())
}

fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(D::Error::custom)
}
