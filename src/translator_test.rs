// Unit tests for placeholder translation

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_plain_text_is_untouched() {
    let translator = PlaceholderTranslator::new("en_US");
    assert_eq!(translator.translate_placeholders("Sign In"), "Sign In");
    assert_eq!(NoopTranslator.translate_placeholders("{{Sign In}}"), "{{Sign In}}");
}

#[test]
fn test_placeholders_use_active_locale() {
    let translator = PlaceholderTranslator::new("de_DE");
    translator.add_translation("de_DE", "Sign In", "Anmelden");
    translator.add_translation("fr_FR", "Sign In", "Connexion");

    assert_eq!(translator.translate_placeholders("{{Sign In}}"), "Anmelden");
    assert_eq!(
        translator.translate_placeholders("Click {{Sign In}} now"),
        "Click Anmelden now"
    );
}

#[test]
fn test_missing_translation_keeps_key() {
    let translator = PlaceholderTranslator::new("en_US");
    assert_eq!(translator.translate_placeholders("{{Cart}} ({{Items}})"), "Cart (Items)");
}

#[test]
fn test_unterminated_placeholder_is_left_alone() {
    let translator = PlaceholderTranslator::new("en_US");
    assert_eq!(translator.translate_placeholders("a {{b"), "a {{b");
}

#[test]
fn test_load_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("de.json");
    std::fs::write(&path, r#"{"Checkout": "Zur Kasse", "Cart": "Warenkorb"}"#).unwrap();

    let translator = PlaceholderTranslator::new("de_DE");
    assert_eq!(translator.load_json_file(&path, "de_DE").unwrap(), 2);
    assert_eq!(translator.translate_placeholders("{{Checkout}}"), "Zur Kasse");
}

#[test]
fn test_load_json_file_rejects_nested_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"Checkout": {"nested": true}}"#).unwrap();

    let translator = PlaceholderTranslator::new("de_DE");
    let err = translator.load_json_file(&path, "de_DE").unwrap_err();
    assert!(matches!(err, PageprobeError::InvalidConfiguration(_)));
}
