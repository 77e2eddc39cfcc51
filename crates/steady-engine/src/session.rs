//! A browser session: one driver handle plus the configuration every
//! interaction and wait on it uses.
//!
//! Scenarios compose a `Session` instead of sharing a global driver, so
//! parallel workers each own an independent one.

use crate::config::{PollConfig, SteadyConfig};
use crate::driver::{Driver, DriverError};
use crate::interact::{
    Clear, Click, Interaction, InteractionError, InteractionSuccess, TypeText, safe_interact,
};
use crate::poll::{PollError, PollSuccess, poll_until};
use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use steady_common::command::WaitCondition;
use steady_common::protocol::{Locator, NavigationResult, Readiness};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Wait(#[from] PollError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Session<D: Driver> {
    driver: D,
    config: SteadyConfig,
}

impl<D: Driver> Session<D> {
    pub fn new(driver: D, config: SteadyConfig) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &SteadyConfig {
        &self.config
    }

    pub async fn launch(&mut self) -> Result<(), SessionError> {
        self.driver.launch().await?;
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), SessionError> {
        self.driver.close().await?;
        Ok(())
    }

    pub async fn navigate(&self, url: &str) -> Result<NavigationResult, SessionError> {
        info!(url, "navigating");
        let result = self.driver.navigate(url).await?;
        info!(url = %result.url, title = %result.title, "navigation complete");
        Ok(result)
    }

    pub async fn safe_click(&self, locator: &Locator) -> Result<InteractionSuccess, SessionError> {
        self.interact(locator, Readiness::Clickable, &Click::new()).await
    }

    pub async fn safe_type(
        &self,
        locator: &Locator,
        text: &str,
    ) -> Result<InteractionSuccess, SessionError> {
        self.interact(locator, Readiness::Visible, &TypeText::new(text)).await
    }

    pub async fn safe_clear(&self, locator: &Locator) -> Result<InteractionSuccess, SessionError> {
        self.interact(locator, Readiness::Visible, &Clear).await
    }

    /// Run any interaction through the retrying wrapper with this session's settings.
    pub async fn interact<I>(
        &self,
        locator: &Locator,
        readiness: Readiness,
        interaction: &I,
    ) -> Result<InteractionSuccess, SessionError>
    where
        I: Interaction<D> + ?Sized,
    {
        Ok(safe_interact(
            &self.driver,
            locator,
            readiness,
            interaction,
            &self.config.interaction,
        )
        .await?)
    }

    pub async fn wait_for_visible(&self, locator: &Locator) -> Result<PollSuccess, SessionError> {
        self.wait_for(&WaitCondition::Visible(locator.clone()), &self.config.wait).await
    }

    /// Succeeds once nothing visible matches the locator.
    pub async fn wait_for_hidden(&self, locator: &Locator) -> Result<PollSuccess, SessionError> {
        self.wait_for(&WaitCondition::Hidden(locator.clone()), &self.config.wait).await
    }

    pub async fn wait_for_clickable(
        &self,
        locator: &Locator,
    ) -> Result<PollSuccess, SessionError> {
        self.wait_for(&WaitCondition::Clickable(locator.clone()), &self.config.wait).await
    }

    /// Succeeds once the element's text contains `expected`.
    pub async fn wait_for_text(
        &self,
        locator: &Locator,
        expected: &str,
    ) -> Result<PollSuccess, SessionError> {
        let condition = WaitCondition::Text(locator.clone(), expected.to_string());
        self.wait_for(&condition, &self.config.wait).await
    }

    /// Poll a [`WaitCondition`] with an explicit poll configuration.
    pub async fn wait_for(
        &self,
        condition: &WaitCondition,
        config: &PollConfig,
    ) -> Result<PollSuccess, SessionError> {
        let driver = &self.driver;
        let description = describe(condition);
        let outcome = poll_until(&description, config, move || holds(driver, condition)).await?;
        debug!(
            condition = %description,
            attempts = outcome.attempts,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "wait satisfied"
        );
        Ok(outcome)
    }

    /// Poll an arbitrary condition with the session's wait configuration.
    pub async fn wait_until<F, Fut, E>(
        &self,
        description: &str,
        condition: F,
    ) -> Result<PollSuccess, SessionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
        E: Display,
    {
        Ok(poll_until(description, &self.config.wait, condition).await?)
    }

    /// Single check without polling.
    pub async fn is_displayed(&self, locator: &Locator) -> Result<bool, SessionError> {
        Ok(holds(&self.driver, &WaitCondition::Visible(locator.clone())).await?)
    }

    pub async fn execute_script(&self, script: &str) -> Result<serde_json::Value, SessionError> {
        Ok(self.driver.execute_script(script, vec![]).await?)
    }

    /// Save a PNG screenshot to `path`, creating parent directories. Returns the byte count.
    pub async fn screenshot(&self, path: &Path) -> Result<usize, SessionError> {
        let data = self.driver.screenshot().await?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &data).await?;
        info!(path = %path.display(), bytes = data.len(), "screenshot saved");
        Ok(data.len())
    }
}

/// Human-readable form of a condition, used in timeout messages.
pub fn describe(condition: &WaitCondition) -> String {
    match condition {
        WaitCondition::Visible(locator) => format!("{} to be visible", locator),
        WaitCondition::Hidden(locator) => format!("{} to be hidden", locator),
        WaitCondition::Clickable(locator) => format!("{} to be clickable", locator),
        WaitCondition::Text(locator, text) => format!("{} to contain text '{}'", locator, text),
    }
}

/// Evaluate a condition once. A locator that matches nothing is neither
/// visible nor clickable, and counts as hidden.
async fn holds<D: Driver>(driver: &D, condition: &WaitCondition) -> Result<bool, DriverError> {
    match condition {
        WaitCondition::Visible(locator) => match driver.find(locator).await? {
            Some(element) => driver.is_visible(&element).await,
            None => Ok(false),
        },
        WaitCondition::Hidden(locator) => match driver.find(locator).await? {
            Some(element) => Ok(!driver.is_visible(&element).await?),
            None => Ok(true),
        },
        WaitCondition::Clickable(locator) => match driver.find(locator).await? {
            Some(element) => driver.is_clickable(&element).await,
            None => Ok(false),
        },
        WaitCondition::Text(locator, expected) => match driver.find(locator).await? {
            Some(element) => Ok(driver.text(&element).await?.contains(expected.as_str())),
            None => Ok(false),
        },
    }
}
