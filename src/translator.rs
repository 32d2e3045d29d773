//! Placeholder translation applied to text-based locators

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use tracing::debug;

use crate::errors::{PageprobeError, Result};

/// Translates `{{placeholder}}` tokens into locale-specific text
pub trait Translator: Send + Sync {
    fn translate_placeholders(&self, text: &str) -> String;
}

/// Identity translator, used when no locale data is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn translate_placeholders(&self, text: &str) -> String {
        text.to_string()
    }
}

/// In-memory translation tables keyed by locale
#[derive(Debug)]
pub struct PlaceholderTranslator {
    locale: String,
    tables: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl PlaceholderTranslator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn add_translation(&self, locale: &str, source: &str, translated: &str) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables
            .entry(locale.to_string())
            .or_default()
            .insert(source.to_string(), translated.to_string());
    }

    /// Load a flat JSON object of `"source": "translation"` pairs
    pub fn load_json_file(&self, path: &Path, locale: &str) -> Result<usize> {
        let content = fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            PageprobeError::InvalidConfiguration(format!(
                "Translation file {} is not a flat JSON object: {}",
                path.display(),
                e
            ))
        })?;

        let count = entries.len();
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.entry(locale.to_string()).or_default().extend(entries);
        debug!("Loaded {} translations for {} from {}", count, locale, path.display());
        Ok(count)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(&self.locale).and_then(|t| t.get(key)).cloned()
    }
}

impl Translator for PlaceholderTranslator {
    fn translate_placeholders(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            output.push_str(&rest[..start]);
            let key = &rest[start + 2..start + 2 + len];
            match self.lookup(key) {
                Some(translated) => output.push_str(&translated),
                None => output.push_str(key),
            }
            rest = &rest[start + 2 + len + 2..];
        }

        output.push_str(rest);
        output
    }
}

#[cfg(test)]
#[path = "translator_test.rs"]
mod translator_test;
