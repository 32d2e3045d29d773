//! The browser seam: every element lookup and page query goes through [`Driver`]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::{PageprobeError, Result};
use crate::locator::Query;

/// Interval between polls of a bounded wait
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser session operations the locator layer relies on
///
/// # Implementations
///
/// - `Browser` - fantoccini WebDriver session
/// - `MockDriver` - in-memory page for unit testing
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Handle to an element found on the page
    type Element: Send + Sync;

    /// Find the first element matching `query`, or `NotFound`
    async fn find(&self, query: &Query) -> Result<Self::Element>;

    /// Whether at least one element matches `query`
    async fn exists(&self, query: &Query) -> Result<bool>;

    async fn title(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    async fn text(&self, element: &Self::Element) -> Result<String>;

    /// Poll until an element matching `query` is displayed and enabled.
    ///
    /// A timeout too large to represent as an instant never expires.
    async fn wait_until_clickable(&self, query: &Query, timeout: Duration) -> Result<Self::Element> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            match self.find(query).await {
                Ok(element) => {
                    if self.is_displayed(&element).await? && self.is_enabled(&element).await? {
                        return Ok(element);
                    }
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(PageprobeError::Timeout(format!(
                    "{} did not become clickable within {:?}",
                    query, timeout
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// End the browser session
    async fn close(&self) -> Result<()>;
}

/// An element of the in-memory page served by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    pub tag: String,
    pub text: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Verbatim XPath expressions this element answers to
    pub xpaths: Vec<String>,
    /// Parent selector the element is nested under
    pub scope: Option<String>,
    pub displayed: bool,
    pub enabled: bool,
}

impl MockElement {
    pub fn new(tag: &str, text: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: text.to_string(),
            id: None,
            classes: Vec::new(),
            xpaths: Vec::new(),
            scope: None,
            displayed: true,
            enabled: true,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_xpath(mut self, xpath: &str) -> Self {
        self.xpaths.push(xpath.to_string());
        self
    }

    pub fn within(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn matches_css(&self, selector: &str) -> bool {
        let selector = selector.trim();
        let split = selector.find(['#', '.']).unwrap_or(selector.len());
        let (tag, rest) = selector.split_at(split);
        if !tag.is_empty() && tag != self.tag && tag != "*" {
            return false;
        }
        match rest.chars().next() {
            None => !tag.is_empty(),
            Some('#') => self.id.as_deref() == Some(&rest[1..]),
            Some('.') => self.classes.iter().any(|c| c == &rest[1..]),
            Some(_) => false,
        }
    }

    fn matches_xpath(&self, xpath: &str) -> bool {
        if self.xpaths.iter().any(|x| x == xpath) {
            return true;
        }
        let Some(text_xpath) = TextXPath::parse(xpath) else {
            return false;
        };
        if text_xpath.scope != self.scope.as_deref().unwrap_or("") {
            return false;
        }
        if text_xpath.tag != "*" && text_xpath.tag != "body" && text_xpath.tag != self.tag {
            return false;
        }
        if text_xpath.exact {
            self.text.split_whitespace().collect::<Vec<_>>().join(" ") == text_xpath.text
        } else {
            self.text.contains(&text_xpath.text)
        }
    }

    fn matches(&self, query: &Query) -> bool {
        match query {
            Query::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Query::Css(selector) => self.matches_css(selector),
            Query::XPath(xpath) => self.matches_xpath(xpath),
        }
    }
}

/// The text-matching XPath forms generated by the locator layer
struct TextXPath<'a> {
    scope: &'a str,
    tag: &'a str,
    text: String,
    exact: bool,
}

impl<'a> TextXPath<'a> {
    fn parse(xpath: &'a str) -> Option<Self> {
        // The text literal may itself contain `//` or `[`, so anchor on the predicate
        let (open, exact, literal) = Self::predicate(xpath)?;
        let head = &xpath[..open];
        let start = head.rfind("//")?;
        let scope = &head[..start];
        let tag = &head[start + 2..];
        if tag.is_empty() || tag.contains(['/', '[', ']']) {
            return None;
        }

        Some(Self {
            scope,
            tag,
            text: literal.to_string(),
            exact,
        })
    }

    /// Leftmost text predicate whose quoted literal runs to the end of `xpath`
    fn predicate(xpath: &str) -> Option<(usize, bool, &str)> {
        const EXACT: &str = "[normalize-space(.)=";
        const CONTAINS: &str = "[contains(., ";

        let candidates = xpath
            .match_indices(EXACT)
            .map(|(at, _)| (at, true))
            .chain(xpath.match_indices(CONTAINS).map(|(at, _)| (at, false)));

        let mut best: Option<(usize, bool, &str)> = None;
        for (at, exact) in candidates {
            let rest = if exact {
                xpath[at + EXACT.len()..].strip_suffix(']')
            } else {
                xpath[at + CONTAINS.len()..].strip_suffix(")]")
            };
            let Some(text) = rest.and_then(unquote) else {
                continue;
            };
            if best.is_none_or(|(best_at, _, _)| at < best_at) {
                best = Some((at, exact, text));
            }
        }
        best
    }
}

/// Contents of a `"…"` or `'…'` XPath literal
fn unquote(literal: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        let inner = literal.strip_prefix(quote)?.strip_suffix(quote)?;
        (!inner.contains(quote)).then_some(inner)
    })
}

/// Handle to an element of a [`MockDriver`] page (index into its elements)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockHandle(pub usize);

/// In-memory driver for unit testing
///
/// Answers id, simple css (`tag`, `#id`, `.class`, `tag#id`, `tag.class`) and
/// the text XPath forms the locator layer generates. Every query and
/// interaction is recorded for later verification.
#[derive(Debug, Default)]
pub struct MockDriver {
    elements: Mutex<Vec<MockElement>>,
    title: Mutex<String>,
    url: Mutex<String>,
    queries: Mutex<Vec<Query>>,
    actions: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements(elements: Vec<MockElement>) -> Self {
        let driver = Self::new();
        *lock(&driver.elements) = elements;
        driver
    }

    pub fn add_element(&self, element: MockElement) {
        lock(&self.elements).push(element);
    }

    pub fn set_title(&self, title: &str) {
        *lock(&self.title) = title.to_string();
    }

    pub fn set_url(&self, url: &str) {
        *lock(&self.url) = url.to_string();
    }

    /// Every query issued so far, in order
    pub fn queries(&self) -> Vec<Query> {
        lock(&self.queries).clone()
    }

    /// Every interaction issued so far, in order
    pub fn actions(&self) -> Vec<String> {
        lock(&self.actions).clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn element(&self, handle: MockHandle) -> Option<MockElement> {
        lock(&self.elements).get(handle.0).cloned()
    }

    fn lookup(&self, query: &Query) -> Option<MockHandle> {
        lock(&self.queries).push(query.clone());
        lock(&self.elements)
            .iter()
            .position(|e| e.matches(query))
            .map(MockHandle)
    }

    fn get(&self, handle: MockHandle) -> Result<MockElement> {
        self.element(handle)
            .ok_or_else(|| PageprobeError::WebDriver(format!("stale element {}", handle.0)))
    }

    fn record(&self, action: String) {
        debug!("Mock action {}", action);
        lock(&self.actions).push(action);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl Driver for MockDriver {
    type Element = MockHandle;

    async fn find(&self, query: &Query) -> Result<MockHandle> {
        self.lookup(query)
            .ok_or_else(|| PageprobeError::not_found(query.value(), query.strategy()))
    }

    async fn exists(&self, query: &Query) -> Result<bool> {
        Ok(self.lookup(query).is_some())
    }

    async fn title(&self) -> Result<String> {
        Ok(lock(&self.title).clone())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(lock(&self.url).clone())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.record(format!("goto:{url}"));
        self.set_url(url);
        Ok(())
    }

    async fn click(&self, element: &MockHandle) -> Result<()> {
        self.get(*element)?;
        self.record(format!("click:{}", element.0));
        Ok(())
    }

    async fn send_keys(&self, element: &MockHandle, text: &str) -> Result<()> {
        self.get(*element)?;
        self.record(format!("send_keys:{}:{}", element.0, text));
        Ok(())
    }

    async fn is_displayed(&self, element: &MockHandle) -> Result<bool> {
        Ok(self.get(*element)?.displayed)
    }

    async fn is_enabled(&self, element: &MockHandle) -> Result<bool> {
        Ok(self.get(*element)?.enabled)
    }

    async fn text(&self, element: &MockHandle) -> Result<String> {
        Ok(self.get(*element)?.text)
    }

    async fn close(&self) -> Result<()> {
        self.record("close".to_string());
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;
