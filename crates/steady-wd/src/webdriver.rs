use fantoccini::{Client, ClientBuilder};
use steady_common::error::DriverError;

/// Connection to a W3C WebDriver server.
pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, DriverError> {
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(url)
            .await
            .map_err(|e| {
                DriverError::Other(format!("Failed to connect to WebDriver at {}: {}", url, e))
            })?;

        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), DriverError> {
        self.client
            .close()
            .await
            .map_err(|e| DriverError::Other(format!("Failed to close session: {}", e)))
    }
}
