pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    ConditionErrors, InteractionConfig, PollConfig, PollStrategy, ScreenshotConfig, SteadyConfig,
    WebDriverConfig,
};
