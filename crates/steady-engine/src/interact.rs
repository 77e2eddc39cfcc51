//! Safe interactions: resolve, wait for readiness, act, retry.
//!
//! Each call walks `Resolving -> AwaitingReady -> Acting` once per attempt
//! and ends in success or in an [`InteractionError`] carrying only the last
//! attempt's error. Nothing is kept between calls.

use crate::config::InteractionConfig;
use crate::driver::{Driver, DriverError, check_readiness};
use crate::poll::{PollError, poll_until};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use steady_common::protocol::{Locator, Readiness};
use tokio::time::{Instant, sleep};
use tracing::{error, info, warn};

/// Whether an action may run again after an attempt that already invoked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatSafety {
    /// Running the action twice has the same effect as running it once.
    Idempotent,
    /// [`Interaction::already_applied`] is consulted before running it again.
    Guarded,
    /// Never run again once an attempt reached the action.
    SingleShot,
}

/// A single action performed on a resolved element.
#[async_trait]
pub trait Interaction<D: Driver>: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn repeat_safety(&self) -> RepeatSafety;

    /// For [`RepeatSafety::Guarded`] actions: whether an earlier failed attempt
    /// already took effect, in which case the interaction counts as done.
    async fn already_applied(
        &self,
        _driver: &D,
        _element: &D::Element,
    ) -> Result<bool, DriverError> {
        Ok(false)
    }

    async fn perform(&self, driver: &D, element: &D::Element) -> Result<(), DriverError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Click {
    single_shot: bool,
}

impl Click {
    pub fn new() -> Self {
        Self::default()
    }

    /// A click that is not repeated once it has been dispatched, e.g. a
    /// submit button whose second click would send the form twice.
    pub fn single_shot() -> Self {
        Self { single_shot: true }
    }
}

#[async_trait]
impl<D: Driver> Interaction<D> for Click {
    fn name(&self) -> &str {
        "click"
    }

    fn repeat_safety(&self) -> RepeatSafety {
        if self.single_shot {
            RepeatSafety::SingleShot
        } else {
            RepeatSafety::Idempotent
        }
    }

    async fn perform(&self, driver: &D, element: &D::Element) -> Result<(), DriverError> {
        driver.click(element).await
    }
}

/// Replaces the element's value, so repeating it is harmless.
#[derive(Debug, Clone)]
pub struct TypeText {
    text: String,
}

impl TypeText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl<D: Driver> Interaction<D> for TypeText {
    fn name(&self) -> &str {
        "type"
    }

    fn repeat_safety(&self) -> RepeatSafety {
        RepeatSafety::Idempotent
    }

    async fn perform(&self, driver: &D, element: &D::Element) -> Result<(), DriverError> {
        driver.set_value(element, &self.text).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Clear;

#[async_trait]
impl<D: Driver> Interaction<D> for Clear {
    fn name(&self) -> &str {
        "clear"
    }

    fn repeat_safety(&self) -> RepeatSafety {
        RepeatSafety::Idempotent
    }

    async fn perform(&self, driver: &D, element: &D::Element) -> Result<(), DriverError> {
        driver.clear_value(element).await
    }
}

/// Step of an attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    AwaitingReady,
    Acting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Resolving => "resolving",
            Stage::AwaitingReady => "awaiting_ready",
            Stage::Acting => "acting",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptError {
    #[error("No element matches {0}")]
    ResolutionFailed(String),

    #[error("Resolving {locator} failed: {source}")]
    Resolve {
        locator: String,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    NotReady(#[from] PollError),

    #[error("Checking for an earlier effect failed: {0}")]
    AlreadyAppliedCheck(DriverError),

    #[error("Action failed: {0}")]
    Action(DriverError),
}

impl AttemptError {
    pub fn stage(&self) -> Stage {
        match self {
            AttemptError::ResolutionFailed(_) | AttemptError::Resolve { .. } => Stage::Resolving,
            AttemptError::NotReady(_) => Stage::AwaitingReady,
            AttemptError::AlreadyAppliedCheck(_) | AttemptError::Action(_) => Stage::Acting,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AttemptError::ResolutionFailed(_) => "RESOLUTION_FAILED",
            AttemptError::NotReady(_) => "NOT_READY_TIMEOUT",
            AttemptError::Resolve { source, .. } => source.code(),
            AttemptError::AlreadyAppliedCheck(err) | AttemptError::Action(err) => err.code(),
        }
    }
}

/// Every attempt of an interaction failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{action} on {locator} failed after {attempts} attempts in {elapsed:?}: {last_error}")]
pub struct InteractionError {
    pub action: String,
    pub locator: String,
    pub attempts: u32,
    pub elapsed: Duration,
    #[source]
    pub last_error: AttemptError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionSuccess {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Run `interaction` against `locator`, retrying up to `config.retries` times.
///
/// Every attempt resolves the locator again, waits for `readiness` with
/// `config.readiness`, then performs the action. Failed attempts are logged
/// at `warn` and followed by `config.retry_delay_ms` of suspension; the
/// final failure is logged at `error` and returned. A `retries` of zero is
/// treated as one attempt.
pub async fn safe_interact<D, I>(
    driver: &D,
    locator: &Locator,
    readiness: Readiness,
    interaction: &I,
    config: &InteractionConfig,
) -> Result<InteractionSuccess, InteractionError>
where
    D: Driver,
    I: Interaction<D> + ?Sized,
{
    let started = Instant::now();
    let retries = config.retries.max(1);
    let safety = interaction.repeat_safety();
    let action = interaction.name();

    let mut attempt = 0u32;
    let mut reached_action = false;

    let last_error = loop {
        attempt += 1;
        let guard = safety == RepeatSafety::Guarded && reached_action;

        match attempt_once(driver, locator, readiness, interaction, config, guard).await {
            Ok(previously) => {
                let elapsed = started.elapsed();
                info!(
                    action,
                    locator = %locator,
                    attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    already_applied = previously,
                    "interaction succeeded"
                );
                return Ok(InteractionSuccess {
                    attempts: attempt,
                    elapsed,
                });
            }
            Err(err) => {
                let stage = err.stage();
                warn!(
                    action,
                    locator = %locator,
                    attempt,
                    retries,
                    stage = %stage,
                    code = err.code(),
                    error = %err,
                    "interaction attempt failed"
                );
                reached_action |= stage == Stage::Acting;

                if attempt >= retries {
                    break err;
                }
                if safety == RepeatSafety::SingleShot && stage == Stage::Acting {
                    break err;
                }
                sleep(config.retry_delay()).await;
            }
        }
    };

    let elapsed = started.elapsed();
    error!(
        action,
        locator = %locator,
        attempts = attempt,
        elapsed_ms = elapsed.as_millis() as u64,
        error = %last_error,
        "interaction failed"
    );
    Err(InteractionError {
        action: action.to_string(),
        locator: locator.to_string(),
        attempts: attempt,
        elapsed,
        last_error,
    })
}

/// One pass through the state machine. `Ok(true)` means a guarded action
/// found its effect already in place and was not run again.
async fn attempt_once<D, I>(
    driver: &D,
    locator: &Locator,
    readiness: Readiness,
    interaction: &I,
    config: &InteractionConfig,
    guard: bool,
) -> Result<bool, AttemptError>
where
    D: Driver,
    I: Interaction<D> + ?Sized,
{
    let element = driver
        .find(locator)
        .await
        .map_err(|source| AttemptError::Resolve {
            locator: locator.to_string(),
            source,
        })?
        .ok_or_else(|| AttemptError::ResolutionFailed(locator.to_string()))?;

    let element_ref = &element;
    let description = format!("{} to be {}", locator, readiness);
    poll_until(&description, &config.readiness, move || {
        check_readiness(driver, readiness, element_ref)
    })
    .await?;

    if guard
        && interaction
            .already_applied(driver, &element)
            .await
            .map_err(AttemptError::AlreadyAppliedCheck)?
    {
        return Ok(true);
    }

    interaction
        .perform(driver, &element)
        .await
        .map_err(AttemptError::Action)?;
    Ok(false)
}
