pub mod commands;
pub mod executor;
pub mod history;
pub mod plugin;
pub mod queue;
pub mod results;

pub use commands::*;
pub use executor::execute_queued_commands;
pub use history::{CommandHistory, CommandRecord, COMMAND_HISTORY_CAPACITY};
pub use plugin::CommandsPlugin;
pub use queue::*;
pub use results::*;
