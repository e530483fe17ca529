// NOTE: CLI Layering
//
// - args: clap definitions only, no behaviour
// - config: the persisted TOML configuration and everything built from it
//   (renderer, filter, engine options)
// - commands: logging setup and dispatch to one handler per subcommand
// - handlers: read input, drive the engine, write output
//
// Flags always win over the configuration file; the merge happens once in
// `handlers::render` before any engine object is built.

mod args;
mod commands;
pub mod config;
mod handlers;
mod input;

pub use args::{Cli, Commands, ConfigCommand, LogLevel, RenderArgs};
pub use commands::run;
