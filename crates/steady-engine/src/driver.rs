use async_trait::async_trait;
pub use steady_common::error::DriverError;
use steady_common::protocol::{Locator, NavigationResult, Readiness};

/// The Driver trait is the interface every browser automation backend implements.
///
/// Element handles are only valid for the attempt that resolved them; callers
/// resolve the locator again instead of holding on to an element across retries.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Handle to a resolved element.
    type Element: Clone + Send + Sync + 'static;

    /// Launch the driver (start browser, connect to remote, etc.)
    async fn launch(&mut self) -> Result<(), DriverError>;

    /// Close the driver and cleanup resources.
    async fn close(&mut self) -> Result<(), DriverError>;

    /// Check if the driver is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&self, url: &str) -> Result<NavigationResult, DriverError>;

    /// Resolve a locator to its first matching element, or `None` if nothing matches.
    async fn find(&self, locator: &Locator) -> Result<Option<Self::Element>, DriverError>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool, DriverError>;

    /// Visible, enabled and not covered by another element.
    async fn is_clickable(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Replace the element's value with `text`.
    async fn set_value(&self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    async fn clear_value(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Rendered text of the element.
    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// Execute a script in the browser context.
    async fn execute_script(
        &self,
        _script: &str,
        _args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, DriverError> {
        Err(DriverError::NotSupported("execute_script".into()))
    }

    /// Capture a PNG screenshot of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        Err(DriverError::NotSupported("screenshot".into()))
    }
}

/// Evaluate a readiness predicate against a resolved element.
pub async fn check_readiness<D: Driver + ?Sized>(
    driver: &D,
    readiness: Readiness,
    element: &D::Element,
) -> Result<bool, DriverError> {
    match readiness {
        Readiness::Present => Ok(true),
        Readiness::Visible => driver.is_visible(element).await,
        Readiness::Clickable => driver.is_clickable(element).await,
    }
}
