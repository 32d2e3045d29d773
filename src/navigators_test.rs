#[cfg(test)]
mod tests {
    use crate::driver::{MockDriver, MockElement};
    use crate::navigators::*;
    use crate::themes::AdminThemeConfiguration;
    use std::sync::Arc;

    #[test]
    fn test_entry_xpath_nests_levels() {
        let theme = Arc::new(AdminThemeConfiguration::default());
        let menu = AdminMenu::new(Arc::new(MockDriver::new()), Arc::clone(&theme));

        let expected = format!(
            "{}/{}/{}",
            theme.navigation_base_xpath(),
            theme.navigation_child_xpath(0, "System"),
            theme.navigation_child_xpath(1, "Configuration")
        );
        assert_eq!(menu.entry_xpath("System/Configuration"), expected);
    }

    #[tokio::test]
    async fn test_navigate_clicks_last_entry() {
        let theme = Arc::new(AdminThemeConfiguration::default());
        let xpaths = AdminMenu::new(Arc::new(MockDriver::new()), Arc::clone(&theme));
        let system = xpaths.entry_xpath("System");
        let configuration = xpaths.entry_xpath("System/Configuration");

        let driver = Arc::new(MockDriver::with_elements(vec![
            MockElement::new("li", "System").with_xpath(&system),
            MockElement::new("li", "Configuration").with_xpath(&configuration),
            MockElement::new("a", "Configuration").with_xpath(&format!("{}/a", configuration)),
        ]));
        let menu = AdminMenu::new(Arc::clone(&driver), theme);

        menu.navigate_to("System/Configuration").await.unwrap();
        assert_eq!(driver.actions(), vec!["click:2"]);
    }

    #[tokio::test]
    async fn test_navigate_reports_missing_level() {
        let theme = Arc::new(AdminThemeConfiguration::default());
        let driver = Arc::new(MockDriver::new());
        let menu = AdminMenu::new(Arc::clone(&driver), theme);

        let err = menu.navigate_to("Reports/Sales").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Reports"));
        assert_eq!(driver.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_path_is_invalid() {
        let theme = Arc::new(AdminThemeConfiguration::default());
        let menu = AdminMenu::new(Arc::new(MockDriver::new()), theme);

        let err = menu.navigate_to("/").await.unwrap_err();
        assert!(matches!(err, crate::errors::PageprobeError::InvalidConfiguration(_)));
    }
}
