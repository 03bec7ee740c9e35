//! Utility modules for chainnet-dev

pub mod errors;
pub mod logger;
pub mod prereqs;
pub mod progress;
pub mod prompt;
pub mod shell;

// Re-export commonly used items
pub use logger::{Logger, init_tracing};
pub use prereqs::{CommonPrereqs, Prerequisite};
pub use prompt::{confirm, select};
pub use shell::{
    CommandError, CommandOutput, CommandRunner, ShellRunner, cmd_command_line, command_line,
};
