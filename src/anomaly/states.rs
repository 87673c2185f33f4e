use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reconstruct the sequence at one node from an ancestral state table.
///
/// The table is tab-separated `node, site, state, probA, probC, probG, probT`
/// with `#` comment lines. States for rows matching `node_name` are
/// concatenated in row order. A malformed row is logged and stops processing
/// of the file early, leaving a partial sequence; callers decide whether the
/// result is usable.
pub fn node_sequence(path: &Path, node_name: &str) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("cannot open ancestral state table at: {}", path.display()))?;
    let (reader, _compression) = niffler::get_reader(Box::new(file))
        .with_context(|| format!("cannot read ancestral state table at: {}", path.display()))?;
    let reader = BufReader::new(reader);

    let mut seq = String::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("cannot read {}", path.display()))?;
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            eprintln!(
                "Warning: malformed row at line {} of {}, stopping state parsing early",
                idx + 1,
                path.display()
            );
            break;
        }
        if fields[0] == node_name {
            seq.push_str(fields[2]);
        }
    }

    Ok(seq)
}
