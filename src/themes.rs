//! Theme configurations: locator sets for one application skin

use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::errors::Result;
use crate::locator::xpath_literal;
use crate::registry::ComponentRegistry;

/// Abstract identifier every theme switch points at
pub const THEME_CONFIGURATION: &str = "Pageprobe.Themes.ThemeConfiguration";

/// Abstract identifier for themes that can act as the base theme
pub const BASE_THEME: &str = "Pageprobe.Themes.BaseTheme";

/// A locator set for one application skin
pub trait ThemeConfiguration: Any + Send + Sync {
    /// Short human-readable name used in logs
    fn name(&self) -> &str;

    /// Hook run when the theme becomes the active one.
    ///
    /// Themes use it to point abstract components (navigators, actions) at
    /// their own implementations.
    fn configure(&self, _registry: &ComponentRegistry) -> Result<()> {
        Ok(())
    }
}

/// Locators of the administration panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminThemeConfiguration {
    pub login_username_field: String,
    pub login_password_field: String,
    pub login_submit_button: String,

    pub navigation_base_xpath: String,
    /// Child menu entry; `{level}` and `{name}` are substituted
    pub navigation_child_xpath: String,

    pub popup_message_container_xpath: String,
    pub popup_message_close_button_xpath: String,

    /// `{name}` is substituted with the space-padded tab label as an XPath expression
    pub system_config_tabs_xpath: String,
    pub system_config_section_toggle_xpath: String,
    pub system_config_section_display_check_xpath: String,
    /// `{name}` is the section legend, `{value}` the option value
    pub system_config_toggle_enable_xpath: String,
    pub system_configuration_save_button_xpath: String,
    pub system_config_save_successful_xpath: String,
}

impl AdminThemeConfiguration {
    pub const ID: &'static str = "Pageprobe.Themes.Admin";

    pub fn login_username_field(&self) -> &str {
        &self.login_username_field
    }

    pub fn login_password_field(&self) -> &str {
        &self.login_password_field
    }

    pub fn login_submit_button(&self) -> &str {
        &self.login_submit_button
    }

    pub fn navigation_base_xpath(&self) -> &str {
        &self.navigation_base_xpath
    }

    /// Menu entry `name` at nesting `level` (0 is the top bar)
    pub fn navigation_child_xpath(&self, level: usize, name: &str) -> String {
        self.navigation_child_xpath
            .replace("{level}", &level.to_string())
            .replace("{name}", &xpath_literal(name))
    }

    pub fn popup_message_container_xpath(&self) -> &str {
        &self.popup_message_container_xpath
    }

    pub fn popup_message_close_button_xpath(&self) -> &str {
        &self.popup_message_close_button_xpath
    }

    pub fn system_config_tab_xpath(&self, tab: &str) -> String {
        let padded = format!(r#"concat(" ", {}, " ")"#, xpath_literal(tab));
        self.system_config_tabs_xpath.replace("{name}", &padded)
    }

    pub fn system_config_section_toggle_xpath(&self, section: &str) -> String {
        self.system_config_section_toggle_xpath
            .replace("{name}", &xpath_literal(section))
    }

    pub fn system_config_section_display_check_xpath(&self, section: &str) -> String {
        self.system_config_section_display_check_xpath
            .replace("{name}", &xpath_literal(section))
    }

    pub fn system_config_toggle_enable_xpath(&self, section: &str, enabled: bool) -> String {
        self.system_config_toggle_enable_xpath
            .replace("{name}", &xpath_literal(section))
            .replace("{value}", if enabled { "1" } else { "0" })
    }

    pub fn system_configuration_save_button_xpath(&self) -> &str {
        &self.system_configuration_save_button_xpath
    }

    pub fn system_config_save_successful_xpath(&self) -> &str {
        &self.system_config_save_successful_xpath
    }
}

impl Default for AdminThemeConfiguration {
    fn default() -> Self {
        Self {
            login_username_field: r#"//input[@type="text" and @id="username"]"#.to_string(),
            login_password_field: r#"//input[@type="password" and @id="login"]"#.to_string(),
            login_submit_button: r#"//input[@type="submit" and @value="Login"]"#.to_string(),

            navigation_base_xpath: r#"//ul[@id="nav"]"#.to_string(),
            navigation_child_xpath:
                r#"li[contains(concat(" ",normalize-space(@class)," ")," level{level} ")]/a[.={name}]/.."#
                    .to_string(),

            popup_message_container_xpath: r#"//*[@id="message-popup-window"]"#.to_string(),
            popup_message_close_button_xpath:
                r#"//*[@id="message-popup-window"]/descendant::*[@title="close"]"#.to_string(),

            system_config_tabs_xpath:
                r#"//ul[@id="system_config_tabs"]/descendant::a[contains(concat(" ",normalize-space(.)," "),{name})]"#
                    .to_string(),
            system_config_section_toggle_xpath:
                r#"//form[@id="config_edit_form"]/descendant::div[contains(concat(" ",normalize-space(@class)," ")," section-config ")]/descendant::a[.={name}]"#
                    .to_string(),
            system_config_section_display_check_xpath: r#"//legend[.={name}]"#.to_string(),
            system_config_toggle_enable_xpath:
                r#"//legend[.={name}]/../descendant::td[concat(" ",normalize-space(.)," ") = " Enabled "]/../td/descendant::select/option[@value="{value}"]"#
                    .to_string(),
            system_configuration_save_button_xpath:
                r#"//div[@class="main-col-inner"]/div[@class="content-header"]/descendant::button[@title="Save Config"]"#
                    .to_string(),
            system_config_save_successful_xpath:
                r#"//li[@class="success-msg"]/descendant::span[.="The configuration has been saved."]"#
                    .to_string(),
        }
    }
}

impl ThemeConfiguration for AdminThemeConfiguration {
    fn name(&self) -> &str {
        "admin"
    }
}

#[cfg(test)]
#[path = "themes_test.rs"]
mod themes_test;
