// Unit tests for locator resolution

use super::*;
use crate::driver::{MockDriver, MockElement, MockHandle};
use crate::translator::{NoopTranslator, PlaceholderTranslator};
use pretty_assertions::assert_eq;

fn strategy() -> LocatorStrategy {
    LocatorStrategy::new(Arc::new(NoopTranslator))
}

fn probed_tags(driver: &MockDriver) -> Vec<String> {
    driver
        .queries()
        .iter()
        .map(|q| {
            let value = q.value();
            let start = value.rfind("//").unwrap() + 2;
            let end = value[start..].find('[').unwrap() + start;
            value[start..end].to_string()
        })
        .collect()
}

#[test]
fn test_by_parses_original_names() {
    assert_eq!("byId".parse::<By>().unwrap(), By::Id);
    assert_eq!("byCssSelector".parse::<By>().unwrap(), By::Css);
    assert_eq!("byXpath".parse::<By>().unwrap(), By::XPath);
    assert_eq!("byText".parse::<By>().unwrap(), By::Text);
    assert_eq!("contains_text".parse::<By>().unwrap(), By::ContainsText);
    assert!("byMagic".parse::<By>().is_err());
}

#[test]
fn test_xpath_literal_quoting() {
    assert_eq!(xpath_literal("Sign In"), "\"Sign In\"");
    assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
    assert_eq!(
        xpath_literal("it's \"x\""),
        "concat(\"it's \", '\"', \"x\", '\"', \"\")"
    );
}

#[test]
fn test_text_xpath_templates() {
    assert_eq!(
        text_xpath(By::Text, "span", "Cart", None),
        r#"//span[normalize-space(.)="Cart"]"#
    );
    assert_eq!(
        text_xpath(By::ContainsText, "a", "Cart", Some("//div[@id=\"header\"]")),
        r#"//div[@id="header"]//a[contains(., "Cart")]"#
    );
}

#[test]
fn test_direct_queries() {
    assert_eq!(
        LocatorStrategy::direct_query(&LocatorRequest::id("email")),
        Some(Query::Id("email".into()))
    );
    assert_eq!(
        LocatorStrategy::direct_query(&LocatorRequest::css("button").within("#checkout")),
        Some(Query::Css("#checkout button".into()))
    );
    assert_eq!(
        LocatorStrategy::direct_query(&LocatorRequest::xpath("/li[1]").within("//ul[@id=\"nav\"]")),
        Some(Query::XPath("//ul[@id=\"nav\"]/li[1]".into()))
    );
    assert_eq!(LocatorStrategy::direct_query(&LocatorRequest::text("x")), None);
}

#[tokio::test]
async fn test_direct_lookup_has_no_fallback() {
    let driver = MockDriver::with_elements(vec![MockElement::new("span", "email")]);
    let err = strategy()
        .locate(&driver, &LocatorRequest::id("email"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(driver.queries(), vec![Query::Id("email".into())]);
}

#[tokio::test]
async fn test_text_prefers_earlier_node_type() {
    let driver = MockDriver::with_elements(vec![
        MockElement::new("li", "X"),
        MockElement::new("span", "X"),
    ]);

    let found = strategy().locate(&driver, &LocatorRequest::text("X")).await.unwrap();

    assert_eq!(found, MockHandle(1));
    assert_eq!(probed_tags(&driver), vec!["h1", "h2", "h3", "span", "span"]);
}

#[tokio::test]
async fn test_text_exhaustion_reports_translated_text() {
    let translator = PlaceholderTranslator::new("de_DE");
    translator.add_translation("de_DE", "Checkout", "Zur Kasse");
    let strategy = LocatorStrategy::new(Arc::new(translator));
    let driver = MockDriver::with_elements(vec![MockElement::new("div", "Zur Kasse")]);

    let err = strategy
        .locate(&driver, &LocatorRequest::text("{{Checkout}}"))
        .await
        .unwrap_err();

    match err {
        PageprobeError::NotFound { selector, strategy } => {
            assert_eq!(selector, "Zur Kasse");
            assert_eq!(strategy, "text");
        }
        other => panic!("Expected NotFound, got {other:?}"),
    }
    assert_eq!(probed_tags(&driver), TEXT_NODE_SEARCH.to_vec());
}

#[tokio::test]
async fn test_text_is_translated_before_probe() {
    let translator = PlaceholderTranslator::new("de_DE");
    translator.add_translation("de_DE", "Cart", "Warenkorb");
    let strategy = LocatorStrategy::new(Arc::new(translator));
    let driver = MockDriver::with_elements(vec![MockElement::new("a", "Warenkorb")]);

    let found = strategy
        .locate(&driver, &LocatorRequest::text("{{Cart}}"))
        .await
        .unwrap();
    assert_eq!(found, MockHandle(0));
}

#[tokio::test]
async fn test_specific_node_type_skips_fallback() {
    let driver = MockDriver::with_elements(vec![
        MockElement::new("span", "Save"),
        MockElement::new("button", "Save"),
    ]);

    let found = strategy()
        .locate(&driver, &LocatorRequest::text("Save").with_node_type("button"))
        .await
        .unwrap();
    assert_eq!(found, MockHandle(1));
    assert_eq!(probed_tags(&driver), vec!["button"]);

    let err = strategy()
        .locate(&driver, &LocatorRequest::text("Save").with_node_type("label"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_contains_text_uses_substring() {
    let driver = MockDriver::with_elements(vec![MockElement::new("label", "Ship to this address")]);

    let found = strategy()
        .locate(&driver, &LocatorRequest::contains_text("this address"))
        .await
        .unwrap();
    assert_eq!(found, MockHandle(0));

    let err = strategy()
        .locate(&driver, &LocatorRequest::text("this address"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_parent_scope_is_applied() {
    let driver = MockDriver::with_elements(vec![
        MockElement::new("a", "Account").within("//div[@id=\"footer\"]"),
        MockElement::new("a", "Account").within("//div[@id=\"header\"]"),
    ]);

    let found = strategy()
        .locate(
            &driver,
            &LocatorRequest::text("Account").within("//div[@id=\"header\"]"),
        )
        .await
        .unwrap();
    assert_eq!(found, MockHandle(1));
}

#[tokio::test]
async fn test_resolve_query_returns_matching_probe() {
    let driver = MockDriver::with_elements(vec![MockElement::new("option", "Texas")]);

    let query = strategy()
        .resolve_query(&driver, &LocatorRequest::text("Texas"))
        .await
        .unwrap();
    assert_eq!(query, Query::XPath(r#"//option[normalize-space(.)="Texas"]"#.into()));
}
