use crate::phylo::paths::BranchId;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A node in the phylogenetic tree (arena representation).
#[derive(Debug, Clone)]
pub struct Node {
    /// Sample name for tips, reconstruction label (e.g. "Node17") for
    /// internal nodes. Empty if the serialization carried none.
    pub label: String,
    /// Arena index of the parent node; `None` for the root.
    pub parent: Option<usize>,
    /// Arena indices of the children, in serialization order.
    pub children: Vec<usize>,
    /// Length of the branch above this node.
    pub branch_length: f64,
}

impl Node {
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }
}

/// A rooted phylogenetic tree backed by a node arena.
///
/// The outermost Newick group is the root node itself, so a tree written as
/// `((A:1,B:1)Node2:1,C:2)Node1;` has `Node1` at index 0 and no phantom edge
/// above it.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: usize,
    label_index: HashMap<String, usize>,
}

impl Tree {
    /// Load a Newick tree from a plain or gzip-compressed file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open tree file at: {}", path.display()))?;
        let (mut reader, _compression) = niffler::get_reader(Box::new(file))
            .with_context(|| format!("cannot read tree file at: {}", path.display()))?;
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .with_context(|| format!("tree file is not valid text: {}", path.display()))?;
        Self::from_newick(&text)
            .with_context(|| format!("cannot parse tree file at: {}", path.display()))
    }

    /// Parse a Newick-format tree string, keeping internal node labels from
    /// the `)label:length` position.
    pub fn from_newick(newick: &str) -> Result<Self> {
        let compact: String = newick
            .trim()
            .trim_end_matches(';')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !compact.starts_with('(') {
            bail!("not a rooted Newick tree (expected leading '(')");
        }

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut root = None;

        let chars: Vec<char> = compact.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '(' => {
                    let parent = stack.last().copied();
                    let idx = nodes.len();
                    nodes.push(Node {
                        label: String::new(),
                        parent,
                        children: Vec::new(),
                        branch_length: 0.0,
                    });
                    match parent {
                        Some(p) => nodes[p].children.push(idx),
                        None => {
                            if root.is_some() {
                                bail!("multiple root-level groups in tree");
                            }
                            root = Some(idx);
                        }
                    }
                    stack.push(idx);
                    i += 1;
                }
                ')' => {
                    let closed = match stack.pop() {
                        Some(idx) => idx,
                        None => bail!("unbalanced ')' in tree"),
                    };
                    i += 1;
                    let (label, length, consumed) = parse_label_length(&chars[i..]);
                    if consumed > 0 {
                        nodes[closed].label = label;
                        nodes[closed].branch_length = length;
                        i += consumed;
                    }
                }
                ',' => {
                    i += 1;
                }
                _ => {
                    let (label, length, consumed) = parse_label_length(&chars[i..]);
                    if consumed == 0 {
                        bail!("unexpected character '{}' in tree", chars[i]);
                    }
                    let parent = match stack.last().copied() {
                        Some(p) => p,
                        None => bail!("tip '{}' outside any group", label),
                    };
                    let idx = nodes.len();
                    nodes.push(Node {
                        label,
                        parent: Some(parent),
                        children: Vec::new(),
                        branch_length: length,
                    });
                    nodes[parent].children.push(idx);
                    i += consumed;
                }
            }
        }

        if !stack.is_empty() {
            bail!("unbalanced '(' in tree");
        }
        let root = root.context("empty tree")?;

        let mut label_index = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            if node.label.is_empty() {
                continue;
            }
            if label_index.insert(node.label.clone(), idx).is_some() {
                bail!("duplicate node label '{}' in tree", node.label);
            }
        }

        Ok(Tree {
            nodes,
            root,
            label_index,
        })
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_by_label(&self, label: &str) -> Option<usize> {
        self.label_index.get(label).copied()
    }

    /// Tip ids in arena (serialization) order.
    pub fn tips(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_tip())
            .map(|(idx, _)| idx)
    }

    pub fn n_tips(&self) -> usize {
        self.tips().count()
    }

    /// Every branch of the tree, in arena order: one per node with a parent.
    pub fn branches(&self) -> impl Iterator<Item = BranchId> + '_ {
        self.nodes.iter().filter_map(move |node| {
            let parent = node.parent?;
            Some(BranchId {
                parent: self.nodes[parent].label.clone(),
                child: node.label.clone(),
            })
        })
    }

    /// Cumulative branch length from the root down to `id`.
    pub fn height(&self, id: usize) -> f64 {
        let mut h = 0.0;
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            h += self.nodes[current].branch_length;
            current = parent;
        }
        h
    }

    /// Largest root-to-tip cumulative branch length.
    pub fn tree_height(&self) -> f64 {
        self.tips()
            .map(|t| self.height(t))
            .fold(0.0, f64::max)
    }
}

fn parse_label_length(chars: &[char]) -> (String, f64, usize) {
    let mut label = String::new();
    let mut length_str = String::new();
    let mut i = 0;
    let mut in_length = false;

    while i < chars.len() {
        match chars[i] {
            '(' | ')' | ',' | ';' => break,
            ':' => {
                in_length = true;
                i += 1;
            }
            c => {
                if in_length {
                    length_str.push(c);
                } else {
                    label.push(c);
                }
                i += 1;
            }
        }
    }

    let length = length_str.parse::<f64>().unwrap_or(0.0);
    (label, length, i)
}
