//! Locator requests and their translation into concrete element queries
//!
//! Direct strategies (id, css, xpath) map one-to-one onto a WebDriver query.
//! Text strategies probe a fixed list of node types in order and settle on the
//! first query that matches, so the element a test interacts with never
//! depends on probe order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use fantoccini::Locator;
use tracing::debug;

use crate::driver::Driver;
use crate::errors::{PageprobeError, Result};
use crate::translator::Translator;

/// Node types probed, in order, when a text lookup names no node type
pub const TEXT_NODE_SEARCH: [&str; 8] = ["h1", "h2", "h3", "span", "a", "li", "label", "option"];

/// How a selector string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Id,
    Css,
    XPath,
    /// Exact visible text, whitespace-normalized
    Text,
    /// Visible text containing the selector
    ContainsText,
}

impl By {
    pub fn is_text(&self) -> bool {
        matches!(self, By::Text | By::ContainsText)
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            By::Id => "id",
            By::Css => "css selector",
            By::XPath => "xpath",
            By::Text => "text",
            By::ContainsText => "contains text",
        };
        f.write_str(name)
    }
}

impl FromStr for By {
    type Err = PageprobeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "byId" | "id" => Ok(By::Id),
            "byCssSelector" | "css_selector" | "css" => Ok(By::Css),
            "byXpath" | "xpath" => Ok(By::XPath),
            "byText" | "text" => Ok(By::Text),
            "byContainsText" | "contains_text" => Ok(By::ContainsText),
            _ => Err(PageprobeError::InvalidConfiguration(format!(
                "Unknown locator strategy: {}",
                s
            ))),
        }
    }
}

/// A request to find one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRequest {
    by: By,
    selector: String,
    node_type: Option<String>,
    parent: Option<String>,
}

impl LocatorRequest {
    pub fn new(by: By, selector: impl Into<String>) -> Self {
        Self {
            by,
            selector: selector.into(),
            node_type: None,
            parent: None,
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(By::Id, id)
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(By::Css, selector)
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(By::XPath, xpath)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(By::Text, text)
    }

    pub fn contains_text(text: impl Into<String>) -> Self {
        Self::new(By::ContainsText, text)
    }

    /// Restrict a text lookup to one node type instead of the fallback list
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Scope the search beneath `parent` rather than the document root.
    ///
    /// Ids are document-unique, so the scope is ignored for [`By::Id`].
    pub fn within(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn by(&self) -> By {
        self.by
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

impl fmt::Display for LocatorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.by, self.selector)
    }
}

/// A concrete element query understood by the driver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Id(String),
    Css(String),
    XPath(String),
}

impl Query {
    pub fn locator(&self) -> Locator<'_> {
        match self {
            Query::Id(id) => Locator::Id(id),
            Query::Css(selector) => Locator::Css(selector),
            Query::XPath(xpath) => Locator::XPath(xpath),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Query::Id(v) | Query::Css(v) | Query::XPath(v) => v,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Query::Id(_) => "id",
            Query::Css(_) => "css selector",
            Query::XPath(_) => "xpath",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.strategy(), self.value())
    }
}

/// Quote `text` as an XPath string literal
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    if !text.contains('\'') {
        return format!("'{}'", text);
    }

    let parts: Vec<String> = text.split('"').map(|part| format!("\"{}\"", part)).collect();
    format!("concat({})", parts.join(", '\"', "))
}

/// XPath matching `node` elements by exact or contained text
pub fn text_xpath(by: By, node: &str, text: &str, parent: Option<&str>) -> String {
    let predicate = match by {
        By::ContainsText => format!("contains(., {})", xpath_literal(text)),
        _ => format!("normalize-space(.)={}", xpath_literal(text)),
    };
    format!("{}//{}[{}]", parent.unwrap_or(""), node, predicate)
}

/// Turns [`LocatorRequest`]s into queries and runs them against a driver
#[derive(Clone)]
pub struct LocatorStrategy {
    translator: Arc<dyn Translator>,
}

impl LocatorStrategy {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// The single query of a direct (id, css, xpath) request
    pub fn direct_query(request: &LocatorRequest) -> Option<Query> {
        let parent = request.parent();
        match request.by() {
            By::Id => Some(Query::Id(request.selector().to_string())),
            By::Css => Some(Query::Css(match parent {
                Some(parent) => format!("{} {}", parent, request.selector()),
                None => request.selector().to_string(),
            })),
            By::XPath => Some(Query::XPath(format!(
                "{}{}",
                parent.unwrap_or(""),
                request.selector()
            ))),
            By::Text | By::ContainsText => None,
        }
    }

    /// Settle on the query that will be executed for `request`.
    ///
    /// Text requests without a node type probe [`TEXT_NODE_SEARCH`] in order;
    /// exhausting it is `NotFound` carrying the translated text.
    pub async fn resolve_query<D: Driver>(&self, driver: &D, request: &LocatorRequest) -> Result<Query> {
        if let Some(query) = Self::direct_query(request) {
            return Ok(query);
        }

        if let Some(node) = request.node_type() {
            return Ok(self.text_query(request, node));
        }

        for node in TEXT_NODE_SEARCH {
            let query = self.text_query(request, node);
            debug!("Probing {}", query);
            if driver.exists(&query).await? {
                return Ok(query);
            }
        }

        Err(self.exhausted(request))
    }

    /// Find the element `request` describes
    pub async fn locate<D: Driver>(&self, driver: &D, request: &LocatorRequest) -> Result<D::Element> {
        if request.by().is_text() && request.node_type().is_none() {
            for node in TEXT_NODE_SEARCH {
                let query = self.text_query(request, node);
                debug!("Probing {}", query);
                if !driver.exists(&query).await? {
                    continue;
                }
                // The element may vanish between the probe and the lookup
                match driver.find(&query).await {
                    Ok(element) => return Ok(element),
                    Err(e) if e.is_not_found() => continue,
                    Err(e) => return Err(e),
                }
            }
            return Err(self.exhausted(request));
        }

        let query = self.resolve_query(driver, request).await?;
        debug!("Finding element with {}", query);
        driver.find(&query).await
    }

    fn text_query(&self, request: &LocatorRequest, node: &str) -> Query {
        let text = self.translator.translate_placeholders(request.selector());
        Query::XPath(text_xpath(request.by(), node, &text, request.parent()))
    }

    fn exhausted(&self, request: &LocatorRequest) -> PageprobeError {
        let text = self.translator.translate_placeholders(request.selector());
        PageprobeError::not_found(text, request.by().to_string())
    }
}

impl fmt::Debug for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocatorStrategy").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
