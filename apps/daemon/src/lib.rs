pub mod cli;
pub mod config;
mod main_lib;

pub use main_lib::{build_state, init_tracing, run_command, AppState};
