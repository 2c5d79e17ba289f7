pub mod cli;
pub mod load_config;
pub mod transport;

pub use cli::{run, Cli, Commands};
