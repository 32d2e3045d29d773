use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, info};

use crate::config::{TestCaseConfiguration, ViewportSize};
use crate::driver::Driver;
use crate::errors::{PageprobeError, Result};
use crate::locator::Query;

/// Browser instance for WebDriver automation
pub struct Browser {
    pub(crate) client: Client,
    browser_type: BrowserType,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Mozilla Firefox
    #[default]
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = PageprobeError;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => Err(PageprobeError::InvalidConfiguration(format!(
                "Unsupported browser: {}",
                s
            ))),
        }
    }
}

impl BrowserType {
    /// Conventional WebDriver URL for this browser type
    pub fn get_webdriver_url(&self) -> String {
        match self {
            BrowserType::Firefox => "http://localhost:4444".to_string(),
            BrowserType::Chrome => "http://localhost:9515".to_string(),
        }
    }

    fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }

    /// WebDriver capabilities for a session of this browser
    pub fn capabilities(
        &self,
        viewport: Option<&ViewportSize>,
        headless: bool,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();

        match self {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }
}

impl Browser {
    /// Open a WebDriver session as described by `config`
    pub async fn connect(config: &TestCaseConfiguration) -> Result<Self> {
        let browser_type = config.browser;
        let webdriver_url = config.webdriver_url();
        info!("Connecting to {:?} WebDriver", browser_type);

        if !Self::is_webdriver_running(&webdriver_url).await {
            return Err(PageprobeError::WebDriver(format!(
                "Cannot connect to {} at {}.\n\
                Please ensure it is running:\n\
                  For Firefox: geckodriver --port 4444\n\
                  For Chrome: chromedriver --port 9515",
                browser_type.driver_name(),
                webdriver_url
            )));
        }

        let caps = browser_type.capabilities(config.viewport.as_ref(), config.headless);
        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&webdriver_url)
            .await
            .map_err(|e| {
                PageprobeError::WebDriver(format!("Failed to connect to WebDriver: {}", e))
            })?;

        if let Some(vp) = config.viewport {
            debug!("Setting viewport to {}x{}", vp.width, vp.height);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                // Viewport is best-effort; some drivers refuse resizing headless windows
                debug!("Note: Could not set window size: {}", e);
            }
        }

        Ok(Browser {
            client,
            browser_type,
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }
}

fn miss_or_error(query: &Query, err: fantoccini::error::CmdError) -> PageprobeError {
    if err.is_miss() {
        PageprobeError::not_found(query.value(), query.strategy())
    } else {
        err.into()
    }
}

#[async_trait]
impl Driver for Browser {
    type Element = Element;

    async fn find(&self, query: &Query) -> Result<Element> {
        debug!("Finding element with {}", query);
        self.client
            .find(query.locator())
            .await
            .map_err(|e| miss_or_error(query, e))
    }

    async fn exists(&self, query: &Query) -> Result<bool> {
        match self.client.find_all(query.locator()).await {
            Ok(elements) => Ok(!elements.is_empty()),
            Err(e) if e.is_miss() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;

        // Give the document up to two seconds to finish loading
        for _ in 0..20 {
            match self
                .client
                .execute("return document.readyState === 'complete';", vec![])
                .await
            {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(tokio::time::Duration::from_millis(100)).await,
            }
        }

        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        Ok(element.is_enabled().await?)
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(element.text().await?)
    }

    async fn close(&self) -> Result<()> {
        info!("Closing {:?} session", self.browser_type);
        self.client.clone().close().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod webdriver_test;
