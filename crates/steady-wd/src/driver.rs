use crate::webdriver::WebDriverClient;
use async_trait::async_trait;
use fantoccini::Locator as By;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use steady_engine::config::WebDriverConfig;
use steady_engine::driver::{Driver, DriverError};
use steady_engine::protocol::{Locator, LocatorKind, NavigationResult};
use tracing::{debug, info};

/// True when the element's centre point hits the element itself or one of its descendants.
const NOT_COVERED_JS: &str = r#"
    const el = arguments[0];
    const rect = el.getBoundingClientRect();
    if (rect.width === 0 || rect.height === 0) {
        return false;
    }
    const top = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
    return top !== null && (top === el || el.contains(top));
"#;

/// A resolved element together with the locator that found it.
#[derive(Clone)]
pub struct WebElement {
    element: Element,
    locator: String,
}

impl WebElement {
    pub fn locator(&self) -> &str {
        &self.locator
    }

    fn error(&self, err: CmdError) -> DriverError {
        element_error(&self.locator, err)
    }
}

/// [`Driver`] over a remote W3C WebDriver session.
pub struct WebDriverDriver {
    client: Option<WebDriverClient>,
    config: WebDriverConfig,
}

impl WebDriverDriver {
    pub fn new(config: WebDriverConfig) -> Self {
        Self {
            client: None,
            config,
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WebDriverConfig {
            url: url.into(),
            ..Default::default()
        })
    }

    fn client(&self) -> Result<&WebDriverClient, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }

    async fn navigation_result(client: &WebDriverClient) -> NavigationResult {
        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();

        // WebDriver does not expose the HTTP status of a navigation
        NavigationResult {
            url,
            title,
            status: 200,
        }
    }
}

fn by(locator: &Locator) -> By<'_> {
    match locator.kind() {
        LocatorKind::Css => By::Css(locator.value()),
        LocatorKind::XPath => By::XPath(locator.value()),
        LocatorKind::Id => By::Id(locator.value()),
        LocatorKind::LinkText => By::LinkText(locator.value()),
    }
}

fn element_error(locator: &str, err: CmdError) -> DriverError {
    let message = err.to_string();
    if message.contains("stale element") {
        DriverError::StaleElement {
            locator: locator.to_string(),
        }
    } else if message.contains("not interactable") || message.contains("click intercepted") {
        DriverError::NotInteractable {
            locator: locator.to_string(),
            reason: message,
        }
    } else if message.contains("invalid selector") {
        DriverError::InvalidSelector {
            selector: locator.to_string(),
        }
    } else if message.contains("no such window") || message.contains("invalid session id") {
        DriverError::ConnectionLost
    } else {
        DriverError::Other(message)
    }
}

#[async_trait]
impl Driver for WebDriverDriver {
    type Element = WebElement;

    async fn launch(&mut self) -> Result<(), DriverError> {
        info!(url = %self.config.url, "connecting to WebDriver");
        let client =
            WebDriverClient::connect(&self.config.url, self.config.capabilities.clone()).await?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, DriverError> {
        let client = self.client()?;
        client
            .client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(Self::navigation_result(client).await)
    }

    async fn find(&self, locator: &Locator) -> Result<Option<WebElement>, DriverError> {
        let client = self.client()?;
        let key = locator.to_string();
        let mut matches = client
            .client
            .find_all(by(locator))
            .await
            .map_err(|e| element_error(&key, e))?;
        debug!(locator = %key, matches = matches.len(), "resolved locator");
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(WebElement {
            element: matches.swap_remove(0),
            locator: key,
        }))
    }

    async fn is_visible(&self, element: &WebElement) -> Result<bool, DriverError> {
        element
            .element
            .is_displayed()
            .await
            .map_err(|e| element.error(e))
    }

    async fn is_clickable(&self, element: &WebElement) -> Result<bool, DriverError> {
        if !self.is_visible(element).await? {
            return Ok(false);
        }
        let enabled = element
            .element
            .is_enabled()
            .await
            .map_err(|e| element.error(e))?;
        if !enabled {
            return Ok(false);
        }
        let arg = serde_json::to_value(&element.element)?;
        let uncovered = self
            .client()?
            .client
            .execute(NOT_COVERED_JS, vec![arg])
            .await
            .map_err(|e| element.error(e))?;
        Ok(uncovered.as_bool().unwrap_or(false))
    }

    async fn click(&self, element: &WebElement) -> Result<(), DriverError> {
        element.element.click().await.map_err(|e| element.error(e))
    }

    async fn set_value(&self, element: &WebElement, text: &str) -> Result<(), DriverError> {
        element.element.clear().await.map_err(|e| element.error(e))?;
        element
            .element
            .send_keys(text)
            .await
            .map_err(|e| element.error(e))
    }

    async fn clear_value(&self, element: &WebElement) -> Result<(), DriverError> {
        element.element.clear().await.map_err(|e| element.error(e))
    }

    async fn text(&self, element: &WebElement) -> Result<String, DriverError> {
        element.element.text().await.map_err(|e| element.error(e))
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError> {
        self.client()?
            .client
            .execute(script, args)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.client()?
            .client
            .screenshot()
            .await
            .map_err(|e| DriverError::Other(format!("Screenshot failed: {}", e)))
    }
}
