//! CLI front-end for the event concierge engine.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    handle_ask, handle_clear_cache, handle_plan, handle_toggle, init_logging, load_settings,
};
