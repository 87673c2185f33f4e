use phyloqc_tools::anomaly::report::{write_reversions_csv, REVERSION_FIELDS};
use phyloqc_tools::anomaly::types::ReversionEvent;
use phyloqc_tools::phylo::BranchId;
use std::fs;

fn event(taxon: &str, site: &str, reversion_snp: &str) -> ReversionEvent {
    ReversionEvent {
        taxon: taxon.to_string(),
        site: site.to_string(),
        original_snp: "A->G".to_string(),
        original_branch: BranchId::new("Node1", "Node2"),
        dinucleotide_context: "AG".to_string(),
        reversion_snp: reversion_snp.to_string(),
        reference_alleles: "NC_demo:A".to_string(),
        root_allele: 'A',
        reversion_to: "NC_demo;Root".to_string(),
        reversion_branch: BranchId::new("Node2", taxon),
    }
}

#[test]
fn reversion_csv_roundtrips_rows() {
    let events = vec![
        event("A", "50", "G->A"),
        event("B", "120", "G->A"),
        event("C", "7000", "T->C"),
    ];

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reversions.csv");
    write_reversions_csv(&path, &events).expect("write");

    let content = fs::read_to_string(&path).expect("read back");
    let mut lines = content.lines();
    assert_eq!(
        lines.next().expect("header"),
        REVERSION_FIELDS.join(",")
    );

    let rows: Vec<Vec<&str>> = lines.map(|l| l.split(',').collect()).collect();
    assert_eq!(rows.len(), events.len());
    for (row, event) in rows.iter().zip(&events) {
        assert_eq!(row.len(), REVERSION_FIELDS.len());
        assert_eq!(row[0], event.taxon);
        assert_eq!(row[1], event.site);
        assert_eq!(row[5], event.reversion_snp);
    }
}
