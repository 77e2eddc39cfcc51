//! Shared command execution pipeline for script files and the REPL.
//!
//! input -> parse -> run against a `Session` -> formatted output

use crate::config::ScreenshotConfig;
use crate::driver::Driver;
use crate::interact::InteractionSuccess;
use crate::session::{Session, SessionError, describe};
use std::path::Path;
use std::time::Duration;
use steady_common::command::{Command, ParseError, parse_command};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result of executing a command.
pub struct ExecutionResult {
    /// Formatted output string for display.
    pub output: String,
}

pub struct CommandExecutor {
    screenshots: ScreenshotConfig,
    failures: u32,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::with_screenshots(ScreenshotConfig::default())
    }

    pub fn with_screenshots(screenshots: ScreenshotConfig) -> Self {
        Self {
            screenshots,
            failures: 0,
        }
    }

    /// Number of commands that failed after parsing.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Execute a line of input.
    pub async fn execute_line<D: Driver>(
        &mut self,
        session: &Session<D>,
        line: &str,
    ) -> Result<ExecutionResult, ExecutorError> {
        let command = parse_command(line)?;

        match self.execute_command(session, command).await {
            Ok(output) => Ok(ExecutionResult { output }),
            Err(err) => {
                self.failures += 1;
                if self.screenshots.on_failure {
                    self.capture_failure(session).await;
                }
                Err(err.into())
            }
        }
    }

    async fn execute_command<D: Driver>(
        &self,
        session: &Session<D>,
        command: Command,
    ) -> Result<String, SessionError> {
        match command {
            Command::GoTo(url) => {
                let res = session.navigate(&normalize_url(&url)).await?;
                Ok(format!("Navigated to {}", res.url))
            }
            Command::Click(locator) => {
                let outcome = session.safe_click(&locator).await?;
                Ok(with_attempts(format!("Clicked {}", locator), outcome))
            }
            Command::Type(locator, text) => {
                let outcome = session.safe_type(&locator, &text).await?;
                Ok(with_attempts(format!("Typed into {}", locator), outcome))
            }
            Command::Clear(locator) => {
                let outcome = session.safe_clear(&locator).await?;
                Ok(with_attempts(format!("Cleared {}", locator), outcome))
            }
            Command::Wait(condition, options) => {
                let mut config = session.config().wait.clone();
                if let Some(ms) = options.timeout_ms {
                    config = config.with_timeout(Duration::from_millis(ms));
                }
                let outcome = session.wait_for(&condition, &config).await?;
                Ok(format!(
                    "Done waiting for {} ({}ms)",
                    describe(&condition),
                    outcome.elapsed.as_millis()
                ))
            }
            Command::Script(script) => {
                let value = session.execute_script(&script).await?;
                Ok(value.to_string())
            }
            Command::Screenshot(path) => {
                let output_path = path.unwrap_or_else(|| "screenshot.png".to_string());
                let bytes = session.screenshot(Path::new(&output_path)).await?;
                Ok(format!("Screenshot saved to {} ({} bytes)", output_path, bytes))
            }
        }
    }

    async fn capture_failure<D: Driver>(&self, session: &Session<D>) {
        let path = self
            .screenshots
            .dir
            .join(format!("failure-{}.png", self.failures));
        match session.screenshot(&path).await {
            Ok(_) => info!(path = %path.display(), "captured failure screenshot"),
            Err(e) => warn!(error = %e, "could not capture failure screenshot"),
        }
    }
}

fn with_attempts(message: String, outcome: InteractionSuccess) -> String {
    if outcome.attempts > 1 {
        format!("{} after {} attempts", message, outcome.attempts)
    } else {
        message
    }
}

/// Add `https://` to bare hosts such as `example.com/login`.
pub fn normalize_url(url: &str) -> String {
    let has_scheme = url.contains("://")
        || ["about:", "data:", "file:", "javascript:"]
            .iter()
            .any(|prefix| url.starts_with(prefix));
    if has_scheme {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
