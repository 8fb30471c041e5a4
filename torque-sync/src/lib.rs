pub mod cli;
pub mod dataset;
pub mod load_config;
pub mod mediawiki;

pub use cli::{run, Cli, Commands};
