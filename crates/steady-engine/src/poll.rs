//! Condition polling bounded by a timeout or an attempt budget.
//!
//! `poll_until` evaluates a condition strictly sequentially and suspends
//! between evaluations; it never runs two evaluations concurrently and keeps
//! no state between calls.

use crate::config::{ConditionErrors, PollConfig, PollStrategy};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// A condition held after `attempts` evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSuccess {
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PollError {
    #[error(
        "Timed out waiting for {description} after {elapsed:?} ({attempts} attempts){}",
        last_error_suffix(.last_error)
    )]
    Timeout {
        description: String,
        elapsed: Duration,
        attempts: u32,
        /// Most recent condition error, when errors were swallowed.
        last_error: Option<String>,
    },

    #[error("Condition '{description}' failed on attempt {attempts}: {message}")]
    Condition {
        description: String,
        attempts: u32,
        message: String,
    },

    #[error("Invalid poll configuration: {0}")]
    InvalidConfig(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(err) => format!("; last error: {}", err),
        None => String::new(),
    }
}

/// Evaluate `condition` until it returns `Ok(true)` or the budget in `config` is spent.
///
/// Interval strategies fail once the elapsed time reaches the timeout, checked
/// after every evaluation and again after every suspension, so a condition
/// that never holds fails within `[timeout, timeout + interval)`. A timeout of
/// zero evaluates once without suspending. Backoff strategies fail after
/// `max_attempts` evaluations.
///
/// Condition errors are handled per `config.on_error`.
pub async fn poll_until<F, Fut, E>(
    description: &str,
    config: &PollConfig,
    mut condition: F,
) -> Result<PollSuccess, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    config.validate().map_err(PollError::InvalidConfig)?;

    let started = Instant::now();
    let mut attempts = 0u32;
    let mut last_error = None;

    let timed_out = |attempts: u32, last_error: Option<String>| PollError::Timeout {
        description: description.to_string(),
        elapsed: started.elapsed(),
        attempts,
        last_error,
    };

    loop {
        attempts += 1;
        match condition().await {
            Ok(true) => {
                debug!(description, attempts, "condition met");
                return Ok(PollSuccess {
                    attempts,
                    elapsed: started.elapsed(),
                });
            }
            Ok(false) => debug!(description, attempt = attempts, "condition not met"),
            Err(err) => match config.on_error {
                ConditionErrors::Propagate => {
                    return Err(PollError::Condition {
                        description: description.to_string(),
                        attempts,
                        message: err.to_string(),
                    });
                }
                ConditionErrors::Swallow => {
                    debug!(description, attempt = attempts, error = %err, "condition errored");
                    last_error = Some(err.to_string());
                }
            },
        }

        if budget_spent(&config.strategy, attempts, started.elapsed()) {
            return Err(timed_out(attempts, last_error));
        }

        sleep(config.strategy.delay_after(attempts)).await;

        if let PollStrategy::Interval { timeout_ms, .. } = config.strategy
            && started.elapsed() >= Duration::from_millis(timeout_ms)
        {
            return Err(timed_out(attempts, last_error));
        }
    }
}

fn budget_spent(strategy: &PollStrategy, attempts: u32, elapsed: Duration) -> bool {
    match *strategy {
        PollStrategy::Interval { timeout_ms, .. } => elapsed >= Duration::from_millis(timeout_ms),
        PollStrategy::Backoff { max_attempts, .. } => attempts >= max_attempts,
    }
}
