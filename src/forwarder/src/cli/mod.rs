pub mod commands;
mod process_command;
mod run;

pub use process_command::process_command;
pub use run::{forward_lines, run};
