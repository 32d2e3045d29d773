// Common test utilities and fixtures

use pageprobe::{AdminThemeConfiguration, MockDriver, MockElement, TestCaseConfiguration, TestContext};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Mock HTML pages for live browser tests
#[allow(dead_code)]
pub mod fixtures {
    pub const CHECKOUT_PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Checkout</title></head>
    <body>
        <ul id="steps">
            <li>Shipping</li>
            <li><span>Shipping</span></li>
        </ul>
        <div id="content">Review your order</div>
        <button class="continue">Continue</button>
    </body>
    </html>
    "#;
}

/// Write `content` to a temporary HTML file and return its path
#[allow(dead_code)]
pub fn create_test_html(content: &str) -> PathBuf {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("test.html");
    std::fs::write(&file_path, content).expect("Failed to write test HTML");

    // Leak the temp_dir to keep it alive for the test
    std::mem::forget(temp_dir);
    file_path
}

/// Write a `configuration/` directory with the given JSON files under a fresh temp dir
#[allow(dead_code)]
pub fn create_configuration_dir(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_dir = temp_dir.path().join("configuration");
    std::fs::create_dir(&config_dir).expect("Failed to create configuration dir");
    for (name, content) in files {
        std::fs::write(config_dir.join(name), content).expect("Failed to write configuration");
    }
    temp_dir
}

/// The admin login form plus the menu bar, as the default admin theme locates them
#[allow(dead_code)]
pub fn admin_page() -> MockDriver {
    let theme = AdminThemeConfiguration::default();
    let menu = format!(
        "{}/{}",
        theme.navigation_base_xpath(),
        theme.navigation_child_xpath(0, "System")
    );
    MockDriver::with_elements(vec![
        MockElement::new("input", "").with_xpath(theme.login_username_field()),
        MockElement::new("input", "").with_xpath(theme.login_password_field()),
        MockElement::new("input", "Login").with_xpath(theme.login_submit_button()),
        MockElement::new("li", "System").with_xpath(&menu),
        MockElement::new("a", "System").with_xpath(&format!("{}/a", menu)),
    ])
}

#[allow(dead_code)]
pub fn mock_context(driver: MockDriver) -> (Arc<MockDriver>, TestContext<MockDriver>) {
    let driver = Arc::new(driver);
    let context = TestContext::new(Arc::clone(&driver), TestCaseConfiguration::default())
        .expect("Failed to set up test context");
    (driver, context)
}
