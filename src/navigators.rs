//! Navigators: walking menus to reach a page

use std::sync::Arc;
use tracing::debug;

use crate::driver::Driver;
use crate::errors::{PageprobeError, Result};
use crate::locator::Query;
use crate::themes::AdminThemeConfiguration;

/// Walks the administration menu bar
pub struct AdminMenu<D: Driver> {
    driver: Arc<D>,
    theme: Arc<AdminThemeConfiguration>,
}

impl<D: Driver> AdminMenu<D> {
    pub const ID: &'static str = "Pageprobe.Navigators.AdminMenu";

    pub fn new(driver: Arc<D>, theme: Arc<AdminThemeConfiguration>) -> Self {
        Self { driver, theme }
    }

    /// XPath of the menu entry at the end of `path` (e.g. `System/Configuration`)
    pub fn entry_xpath(&self, path: &str) -> String {
        path.split('/')
            .filter(|name| !name.is_empty())
            .enumerate()
            .fold(self.theme.navigation_base_xpath().to_string(), |xpath, (level, name)| {
                format!("{}/{}", xpath, self.theme.navigation_child_xpath(level, name))
            })
    }

    /// Follow `path` through the menu and click its last entry
    pub async fn navigate_to(&self, path: &str) -> Result<()> {
        let mut xpath = self.theme.navigation_base_xpath().to_string();
        let mut walked = 0;

        for (level, name) in path.split('/').filter(|name| !name.is_empty()).enumerate() {
            xpath = format!("{}/{}", xpath, self.theme.navigation_child_xpath(level, name));
            debug!("Checking menu level {} for {}", level, name);
            if !self.driver.exists(&Query::XPath(xpath.clone())).await? {
                return Err(PageprobeError::not_found(xpath, "xpath"));
            }
            walked += 1;
        }

        if walked == 0 {
            return Err(PageprobeError::InvalidConfiguration(format!(
                "Menu path '{}' names no entry",
                path
            )));
        }

        let link = self.driver.find(&Query::XPath(format!("{}/a", xpath))).await?;
        self.driver.click(&link).await
    }
}

#[cfg(test)]
#[path = "navigators_test.rs"]
mod navigators_test;
