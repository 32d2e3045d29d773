// Unit tests for configuration loading

use super::*;
use pretty_assertions::assert_eq;
use serial_test::serial;

#[test]
fn test_viewport_size_parse() {
    let size = ViewportSize::parse("1920x1080").unwrap();
    assert_eq!(size, ViewportSize { width: 1920, height: 1080 });

    assert!(ViewportSize::parse("1920").is_err());
    assert!(ViewportSize::parse("1920x").is_err());
    assert!(ViewportSize::parse("x1080").is_err());
    assert!(ViewportSize::parse("1920X1080").is_err());
}

#[test]
fn test_defaults() {
    let config = TestCaseConfiguration::default();
    assert_eq!(config.browser, BrowserType::Firefox);
    assert!(config.headless);
    assert_eq!(config.locale, "en_US");
    assert_eq!(config.wait_timeout(), Duration::from_secs(1));
    assert_eq!(config.webdriver_url(), "http://localhost:4444");
}

#[test]
fn test_from_file_with_partial_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{"browser": "chrome", "viewport": "375x667", "namespaces": ["Acme"]}"#,
    )
    .unwrap();

    let config = TestCaseConfiguration::from_file(&path).unwrap();
    assert_eq!(config.browser, BrowserType::Chrome);
    assert_eq!(config.viewport, Some(ViewportSize { width: 375, height: 667 }));
    assert_eq!(config.namespaces, vec!["Acme".to_string()]);
    assert_eq!(config.locale, "en_US");
}

#[test]
fn test_discover_walks_up_and_merges_in_order() {
    let root = tempfile::tempdir().unwrap();
    let conf_dir = root.path().join(CONFIGURATION_DIR);
    fs::create_dir(&conf_dir).unwrap();
    fs::write(conf_dir.join("10-base.json"), r#"{"locale": "de_DE", "headless": false}"#).unwrap();
    fs::write(conf_dir.join("20-local.json"), r#"{"locale": "fr_FR"}"#).unwrap();
    fs::write(conf_dir.join("notes.txt"), "ignored").unwrap();

    let nested = root.path().join("tests").join("admin");
    fs::create_dir_all(&nested).unwrap();

    let config = TestCaseConfiguration::discover(&nested).unwrap();
    assert_eq!(config.locale, "fr_FR");
    assert!(!config.headless);
}

#[test]
fn test_discover_without_directory_uses_defaults() {
    let root = tempfile::tempdir().unwrap();
    let config = TestCaseConfiguration::discover(root.path()).unwrap();
    assert_eq!(config, TestCaseConfiguration::default());
}

#[test]
fn test_discover_rejects_non_object_file() {
    let root = tempfile::tempdir().unwrap();
    let conf_dir = root.path().join(CONFIGURATION_DIR);
    fs::create_dir(&conf_dir).unwrap();
    fs::write(conf_dir.join("bad.json"), "[1, 2]").unwrap();

    let err = TestCaseConfiguration::discover(root.path()).unwrap_err();
    assert!(matches!(err, PageprobeError::InvalidConfiguration(_)));
}

#[test]
#[serial]
fn test_env_overrides() {
    unsafe {
        std::env::set_var("PAGEPROBE_BROWSER", "chromium");
        std::env::set_var("PAGEPROBE_WEBDRIVER_URL", "http://grid:4444");
        std::env::set_var("PAGEPROBE_HEADLESS", "false");
    }

    let mut config = TestCaseConfiguration::default();
    let result = config.apply_env();

    unsafe {
        std::env::remove_var("PAGEPROBE_BROWSER");
        std::env::remove_var("PAGEPROBE_WEBDRIVER_URL");
        std::env::remove_var("PAGEPROBE_HEADLESS");
    }

    result.unwrap();
    assert_eq!(config.browser, BrowserType::Chrome);
    assert_eq!(config.webdriver_url(), "http://grid:4444");
    assert!(!config.headless);
}

#[test]
#[serial]
fn test_env_rejects_bad_headless_value() {
    unsafe {
        std::env::set_var("PAGEPROBE_HEADLESS", "maybe");
    }
    let result = TestCaseConfiguration::default().apply_env();
    unsafe {
        std::env::remove_var("PAGEPROBE_HEADLESS");
    }
    assert!(matches!(result, Err(PageprobeError::InvalidConfiguration(_))));
}
