use crate::config::Config;
use crate::phylo::{branch_paths, Tree};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn run(
    tree_file: String,
    output_file: Option<String>,
    root_label: Option<String>,
) -> Result<()> {
    let config = Config::load();
    let root_label = root_label.unwrap_or_else(|| config.root_label.clone());

    let tree = Tree::from_path(Path::new(&tree_file))?;
    let paths = branch_paths(&tree, &root_label)?;

    let mut writer: Box<dyn Write> = match output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(&path).with_context(|| format!("cannot create {}", path))?,
        )),
        None => Box::new(std::io::stdout()),
    };

    writeln!(writer, "taxon\tdepth\tpath")?;
    for (tip, path) in &paths {
        let joined: Vec<String> = path.iter().map(|branch| branch.to_string()).collect();
        writeln!(writer, "{}\t{}\t{}", tip, path.len(), joined.join(","))?;
    }

    Ok(())
}
