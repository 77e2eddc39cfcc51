use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SteadyConfig {
    /// Polling used by explicit waits (`wait visible`, `wait text`, ...).
    #[serde(default)]
    pub wait: PollConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub screenshots: ScreenshotConfig,
}

/// How a condition is re-evaluated until it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(flatten)]
    pub strategy: PollStrategy,
    #[serde(default)]
    pub on_error: ConditionErrors,
}

/// Exactly one polling strategy is active per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PollStrategy {
    /// Evaluate every `interval_ms` until `timeout_ms` has elapsed.
    Interval { timeout_ms: u64, interval_ms: u64 },
    /// Evaluate up to `max_attempts` times, sleeping
    /// `base_delay_ms * factor^(attempt - 1)` after each failed attempt.
    Backoff {
        base_delay_ms: u64,
        #[serde(default = "default_backoff_factor")]
        factor: f64,
        max_attempts: u32,
    },
}

/// What a condition error means while polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionErrors {
    /// Errors count as "not yet satisfied"; the last one is reported on timeout.
    #[default]
    Swallow,
    /// The first error ends the poll.
    Propagate,
}

impl PollConfig {
    pub fn interval(timeout: Duration, interval: Duration) -> Self {
        Self {
            strategy: PollStrategy::Interval {
                timeout_ms: timeout.as_millis() as u64,
                interval_ms: interval.as_millis() as u64,
            },
            on_error: ConditionErrors::default(),
        }
    }

    pub fn backoff(base_delay: Duration, factor: f64, max_attempts: u32) -> Self {
        Self {
            strategy: PollStrategy::Backoff {
                base_delay_ms: base_delay.as_millis() as u64,
                factor,
                max_attempts,
            },
            on_error: ConditionErrors::default(),
        }
    }

    pub fn propagate_errors(mut self) -> Self {
        self.on_error = ConditionErrors::Propagate;
        self
    }

    pub fn swallow_errors(mut self) -> Self {
        self.on_error = ConditionErrors::Swallow;
        self
    }

    /// Bound polling by `timeout`.
    ///
    /// A backoff strategy becomes an interval strategy polling every
    /// `base_delay_ms`, shortened to the timeout when that is smaller.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let timeout_ms = timeout.as_millis() as u64;
        self.strategy = match self.strategy {
            PollStrategy::Interval { interval_ms, .. } => PollStrategy::Interval {
                timeout_ms,
                interval_ms,
            },
            PollStrategy::Backoff { base_delay_ms, .. } => PollStrategy::Interval {
                timeout_ms,
                interval_ms: base_delay_ms.min(timeout_ms).max(1),
            },
        };
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.strategy {
            PollStrategy::Interval { interval_ms, .. } if interval_ms == 0 => {
                Err("interval_ms must be positive".into())
            }
            PollStrategy::Backoff { base_delay_ms, .. } if base_delay_ms == 0 => {
                Err("base_delay_ms must be positive".into())
            }
            PollStrategy::Backoff { factor, .. }
                if factor.is_nan() || factor < 1.0 || factor.is_infinite() =>
            {
                Err(format!("backoff factor must be >= 1, got {}", factor))
            }
            PollStrategy::Backoff { max_attempts, .. } if max_attempts == 0 => {
                Err("max_attempts must be at least 1".into())
            }
            _ => Ok(()),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::interval(
            Duration::from_millis(default_wait_timeout_ms()),
            Duration::from_millis(default_wait_interval_ms()),
        )
    }
}

impl PollStrategy {
    /// Suspension after the failed 1-based `attempt`, before the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match *self {
            PollStrategy::Interval { interval_ms, .. } => Duration::from_millis(interval_ms),
            PollStrategy::Backoff {
                base_delay_ms,
                factor,
                ..
            } => {
                // Cap the exponent so powi cannot overflow.
                let exp = attempt.saturating_sub(1).min(31) as i32;
                let ms = (base_delay_ms as f64) * factor.powi(exp);
                Duration::from_millis(ms.min(u64::MAX as f64) as u64)
            }
        }
    }
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_wait_timeout_ms() -> u64 {
    10000
}

fn default_wait_interval_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Attempts per interaction, including the first one.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Readiness wait before each attempt.
    #[serde(default)]
    pub readiness: PollConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            readiness: PollConfig::default(),
        }
    }
}

impl InteractionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,
    /// Extra W3C capabilities merged into the new-session request.
    #[serde(default)]
    pub capabilities: serde_json::Map<String, serde_json::Value>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            capabilities: serde_json::Map::new(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// Capture a screenshot when a command fails.
    #[serde(default)]
    pub on_failure: bool,
    #[serde(default = "default_screenshot_dir")]
    pub dir: PathBuf,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            on_failure: false,
            dir: default_screenshot_dir(),
        }
    }
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}
