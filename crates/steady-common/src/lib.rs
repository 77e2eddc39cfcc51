pub mod command;
pub mod error;
pub mod protocol;

pub use command::{Command, ParseError, WaitCondition, WaitOptions, parse_command};
pub use error::DriverError;
pub use protocol::{Locator, LocatorKind, NavigationResult, Readiness};
