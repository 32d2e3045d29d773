// Unit tests for theme locators

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_admin_navigation_child_xpath() {
    let theme = AdminThemeConfiguration::default();
    assert_eq!(
        theme.navigation_child_xpath(1, "Configuration"),
        r#"li[contains(concat(" ",normalize-space(@class)," ")," level1 ")]/a[.="Configuration"]/.."#
    );
}

#[test]
fn test_admin_system_config_xpaths() {
    let theme = AdminThemeConfiguration::default();
    assert_eq!(
        theme.system_config_section_display_check_xpath("Google Analytics"),
        r#"//legend[.="Google Analytics"]"#
    );
    assert!(
        theme
            .system_config_toggle_enable_xpath("Google Analytics", true)
            .ends_with(r#"option[@value="1"]"#)
    );
    assert!(
        theme
            .system_config_tab_xpath("Sales")
            .ends_with(r#",concat(" ", "Sales", " "))]"#)
    );
}

#[test]
fn test_tab_label_with_quotes_stays_a_valid_literal() {
    let theme = AdminThemeConfiguration::default();
    let xpath = theme.system_config_tab_xpath(r#"Say "Hi""#);

    assert!(xpath.ends_with(r#",concat(" ", 'Say "Hi"', " "))]"#));
    assert_eq!(xpath.matches('"').count() % 2, 0);
}

#[test]
fn test_admin_theme_overrides_from_json() {
    let theme: AdminThemeConfiguration =
        serde_json::from_str(r#"{"login_submit_button": "//button[@id=\"sign-in\"]"}"#).unwrap();

    assert_eq!(theme.login_submit_button(), r#"//button[@id="sign-in"]"#);
    assert_eq!(
        theme.login_username_field(),
        AdminThemeConfiguration::default().login_username_field()
    );
}
