pub mod anomaly;
pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod phylo;
pub mod utils;
