pub mod commands;
pub mod context;
pub mod logging;
pub mod preview;
pub mod repl;

pub use context::CliContext;
pub use repl::readline;
