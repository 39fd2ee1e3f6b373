pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod events;
pub mod logging;
pub mod normalize;
