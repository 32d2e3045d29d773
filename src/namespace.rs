//! Short-name to fully-qualified identifier resolution

use tracing::debug;

/// Separator between identifier segments
pub const SEPARATOR: char = '.';

/// Base namespace of the components shipped with this crate
pub const BASE_NAMESPACE: &str = "Pageprobe";

/// Normalize a component request: path-style separators become dots
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().replace('/', ".")
}

/// Ordered list of namespaces searched when resolving short names
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    namespaces: Vec<String>,
}

impl NamespaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a namespace to the search list.
    ///
    /// Registering a namespace that is already present is a no-op, so earlier
    /// registrations keep their priority.
    pub fn register(&mut self, namespace: &str) {
        let namespace = normalize_identifier(namespace);
        let namespace = namespace.trim_matches(SEPARATOR);
        if namespace.is_empty() {
            return;
        }
        if !self.namespaces.iter().any(|n| n == namespace) {
            debug!("Registering namespace {}", namespace);
            self.namespaces.push(namespace.to_string());
        }
    }

    /// Resolve `name` (optionally under `prefix`) to a fully-qualified identifier.
    ///
    /// `exists` answers whether a component is known under a candidate id. When
    /// nothing matches, the unqualified name is returned and failure surfaces
    /// once the caller tries to construct it.
    pub fn resolve<F>(&self, name: &str, prefix: Option<&str>, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let short_name = normalize_identifier(name);
        let candidate = match prefix {
            Some(prefix) => format!(
                "{}{}{}",
                normalize_identifier(prefix).trim_matches(SEPARATOR),
                SEPARATOR,
                short_name
            ),
            None => short_name.clone(),
        };

        if self.is_qualified(&candidate) {
            return candidate;
        }

        for namespace in &self.namespaces {
            let qualified = format!("{}{}{}", namespace, SEPARATOR, candidate);
            if exists(&qualified) {
                debug!("Resolved {} to {}", candidate, qualified);
                return qualified;
            }
        }

        debug!("No namespace provides {}, using it unqualified", candidate);
        short_name
    }

    /// Whether the identifier already lives under a registered namespace
    pub fn is_qualified(&self, identifier: &str) -> bool {
        self.namespaces.iter().any(|namespace| {
            identifier == namespace
                || (identifier.starts_with(namespace.as_str())
                    && identifier[namespace.len()..].starts_with(SEPARATOR))
        })
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
#[path = "namespace_test.rs"]
mod namespace_test;
