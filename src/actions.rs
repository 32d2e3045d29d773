//! Actions: multi-step interactions expressed against a theme's locators

use std::sync::Arc;
use tracing::{debug, info};

use crate::driver::Driver;
use crate::errors::Result;
use crate::locator::Query;
use crate::themes::AdminThemeConfiguration;

/// Signs in to the administration panel
pub struct AdminLogin<D: Driver> {
    driver: Arc<D>,
    theme: Arc<AdminThemeConfiguration>,
}

impl<D: Driver> AdminLogin<D> {
    pub const ID: &'static str = "Pageprobe.Actions.AdminLogin";

    pub fn new(driver: Arc<D>, theme: Arc<AdminThemeConfiguration>) -> Self {
        Self { driver, theme }
    }

    /// Fill in the login form, submit it and dismiss the message popup if one shows up
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        info!("Logging in to admin as {}", username);

        let username_field = self.find(self.theme.login_username_field()).await?;
        self.driver.send_keys(&username_field, username).await?;

        let password_field = self.find(self.theme.login_password_field()).await?;
        self.driver.send_keys(&password_field, password).await?;

        let submit = self.find(self.theme.login_submit_button()).await?;
        self.driver.click(&submit).await?;

        self.close_popup().await
    }

    /// Close the admin message popup when it is displayed
    pub async fn close_popup(&self) -> Result<()> {
        let container = Query::XPath(self.theme.popup_message_container_xpath().to_string());
        let popup = match self.driver.find(&container).await {
            Ok(popup) => popup,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };

        if self.driver.is_displayed(&popup).await? {
            debug!("Closing admin message popup");
            let close = self.find(self.theme.popup_message_close_button_xpath()).await?;
            self.driver.click(&close).await?;
        }
        Ok(())
    }

    async fn find(&self, xpath: &str) -> Result<D::Element> {
        self.driver.find(&Query::XPath(xpath.to_string())).await
    }
}

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;
