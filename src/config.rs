//! Test case configuration: defaults, `configuration/*.json` discovery, env overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{PageprobeError, Result};
use crate::webdriver::BrowserType;

/// Directory searched for JSON configuration files
pub const CONFIGURATION_DIR: &str = "configuration";

/// How many directories above the start directory discovery will climb
pub const MAX_DISCOVERY_DEPTH: usize = 5;

/// Browser viewport dimensions, written as `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || {
            PageprobeError::InvalidConfiguration(format!(
                "Invalid viewport '{}'. Use WIDTHxHEIGHT (e.g., 1920x1080)",
                s
            ))
        };
        let (width, height) = s.split_once('x').ok_or_else(invalid)?;
        Ok(ViewportSize {
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for ViewportSize {
    type Error = PageprobeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ViewportSize> for String {
    fn from(size: ViewportSize) -> Self {
        format!("{}x{}", size.width, size.height)
    }
}

/// A translation table loaded at context setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSource {
    pub path: PathBuf,
    pub locale: String,
}

/// Settings for one test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCaseConfiguration {
    pub browser: BrowserType,
    /// WebDriver endpoint; the browser's conventional port when unset
    pub webdriver_url: Option<String>,
    pub headless: bool,
    pub viewport: Option<ViewportSize>,
    pub locale: String,
    /// Bound for clickable waits, in seconds
    pub wait_timeout_secs: u64,
    /// Namespaces searched before the built-in one, in priority order
    pub namespaces: Vec<String>,
    /// Theme switched to at setup
    pub theme: Option<String>,
    pub translations: Vec<TranslationSource>,
}

impl Default for TestCaseConfiguration {
    fn default() -> Self {
        Self {
            browser: BrowserType::default(),
            webdriver_url: None,
            headless: true,
            viewport: None,
            locale: "en_US".to_string(),
            wait_timeout_secs: 1,
            namespaces: Vec::new(),
            theme: None,
            translations: Vec::new(),
        }
    }
}

impl TestCaseConfiguration {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Discover configuration starting at the current directory, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::discover(&std::env::current_dir()?)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Find the nearest `configuration/` directory at or above `start` and
    /// merge its JSON files in file-name order; later files win per key
    pub fn discover(start: &Path) -> Result<Self> {
        let Some(dir) = Self::find_configuration_dir(start) else {
            debug!("No {} directory found above {}", CONFIGURATION_DIR, start.display());
            return Ok(Self::default());
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut merged = serde_json::Map::new();
        for file in &files {
            let content = fs::read_to_string(file)?;
            match serde_json::from_str::<serde_json::Value>(&content)? {
                serde_json::Value::Object(values) => merged.extend(values),
                _ => {
                    return Err(PageprobeError::InvalidConfiguration(format!(
                        "{} must contain a JSON object",
                        file.display()
                    )));
                }
            }
        }

        info!("Loaded {} configuration file(s) from {}", files.len(), dir.display());
        Ok(serde_json::from_value(serde_json::Value::Object(merged))?)
    }

    fn find_configuration_dir(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .take(MAX_DISCOVERY_DEPTH + 1)
            .map(|dir| dir.join(CONFIGURATION_DIR))
            .find(|dir| dir.is_dir())
    }

    /// Apply `PAGEPROBE_BROWSER`, `PAGEPROBE_WEBDRIVER_URL` and `PAGEPROBE_HEADLESS`
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(browser) = std::env::var("PAGEPROBE_BROWSER") {
            self.browser = browser.parse()?;
        }
        if let Ok(url) = std::env::var("PAGEPROBE_WEBDRIVER_URL") {
            self.webdriver_url = Some(url);
        }
        if let Ok(headless) = std::env::var("PAGEPROBE_HEADLESS") {
            self.headless = match headless.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(PageprobeError::InvalidConfiguration(format!(
                        "PAGEPROBE_HEADLESS must be true or false, got '{}'",
                        other
                    )));
                }
            };
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn webdriver_url(&self) -> String {
        self.webdriver_url
            .clone()
            .unwrap_or_else(|| self.browser.get_webdriver_url())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
