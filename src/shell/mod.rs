//! Subprocess execution and host queries.

pub mod command;
pub mod mock;
pub mod platform;
pub mod runner;

pub use command::{execute, CommandOptions, CommandResult, Invocation};
pub use mock::MockRunner;
pub use platform::{effective_uid, is_ci};
pub use runner::{CommandRunner, SystemRunner};
