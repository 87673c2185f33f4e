pub mod newick;
pub mod paths;

pub use newick::{Node, Tree};
pub use paths::{branch_paths, BranchId};
