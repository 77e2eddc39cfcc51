pub mod cli;
pub mod config;
pub mod driver;
pub mod executor;
pub mod interact;
pub mod poll;
pub mod session;

pub use steady_common::command;
pub use steady_common::protocol;
