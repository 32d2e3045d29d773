//! Per-test execution context
//!
//! A [`TestContext`] owns everything one test touches: the namespace search
//! list, the component registry with its shared-instance cache, the driver and
//! the translator. It is torn down at the end of the test whatever the
//! outcome; [`TestContext::run`] guarantees that, including when the test
//! body panics.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::actions::AdminLogin;
use crate::config::TestCaseConfiguration;
use crate::driver::Driver;
use crate::errors::{PageprobeError, Result};
use crate::locator::{By, LocatorRequest, LocatorStrategy, xpath_literal};
use crate::namespace::{BASE_NAMESPACE, NamespaceResolver};
use crate::navigators::AdminMenu;
use crate::registry::{Component, ComponentKind, ComponentRegistry, Container};
use crate::themes::{AdminThemeConfiguration, BASE_THEME, THEME_CONFIGURATION, ThemeConfiguration};
use crate::translator::{PlaceholderTranslator, Translator};
use crate::webdriver::Browser;

/// Identifier of the driver shared instance
pub const WEBDRIVER: &str = "Pageprobe.WebDriver";
/// Identifier of the translator shared instance
pub const TRANSLATOR: &str = "Pageprobe.Translator";
/// Identifier of the configuration shared instance
pub const CONFIGURATION: &str = "Pageprobe.Configuration";

type PostTestCallback = Box<dyn FnOnce() + Send>;

/// Register the components shipped with this crate
pub fn register_builtin_components<D: Driver>(container: &mut Container) {
    container.register_theme(AdminThemeConfiguration::ID, ComponentKind::Theme, |_| {
        Ok(AdminThemeConfiguration::default())
    });

    container.register(AdminLogin::<D>::ID, ComponentKind::Action, |registry| {
        let driver = registry.get_as::<D>(WEBDRIVER)?;
        Ok(Arc::new(AdminLogin::new(driver, active_admin_theme(registry)?)) as Component)
    });

    container.register(AdminMenu::<D>::ID, ComponentKind::Navigator, |registry| {
        let driver = registry.get_as::<D>(WEBDRIVER)?;
        Ok(Arc::new(AdminMenu::new(driver, active_admin_theme(registry)?)) as Component)
    });
}

/// The active theme when it is an admin theme, otherwise the built-in one
fn active_admin_theme(registry: &ComponentRegistry) -> Result<Arc<AdminThemeConfiguration>> {
    if registry.preference(THEME_CONFIGURATION).is_some() {
        match registry.get_as::<AdminThemeConfiguration>(THEME_CONFIGURATION) {
            Ok(theme) => return Ok(theme),
            Err(e) => debug!("Active theme has no admin locators, using the built-in ones: {}", e),
        }
    }
    registry.get_as::<AdminThemeConfiguration>(AdminThemeConfiguration::ID)
}

/// Everything one acceptance test works with
pub struct TestContext<D: Driver = Browser> {
    config: TestCaseConfiguration,
    namespaces: RwLock<NamespaceResolver>,
    registry: ComponentRegistry,
    driver: Arc<D>,
    translator: Arc<PlaceholderTranslator>,
    locators: LocatorStrategy,
    post_callbacks: Mutex<Vec<PostTestCallback>>,
    torn_down: AtomicBool,
}

impl TestContext<Browser> {
    /// Connect to WebDriver as configured and set up a context around the session
    pub async fn launch(config: TestCaseConfiguration) -> Result<Self> {
        let browser = Browser::connect(&config).await?;
        Self::new(Arc::new(browser), config)
    }
}

impl<D: Driver> TestContext<D> {
    pub fn new(driver: Arc<D>, config: TestCaseConfiguration) -> Result<Self> {
        Self::with_container(driver, config, Container::new())
    }

    /// Set up a context whose registry also serves the components in `container`
    pub fn with_container(
        driver: Arc<D>,
        config: TestCaseConfiguration,
        mut container: Container,
    ) -> Result<Self> {
        // Configured namespaces go first so they take precedence over the built-in one
        let mut namespaces = NamespaceResolver::new();
        for namespace in &config.namespaces {
            namespaces.register(namespace);
        }
        namespaces.register(BASE_NAMESPACE);

        register_builtin_components::<D>(&mut container);
        let registry = ComponentRegistry::new(container);

        let translator = Arc::new(PlaceholderTranslator::new(config.locale.clone()));
        for source in &config.translations {
            translator.load_json_file(&source.path, &source.locale)?;
        }

        registry.add_shared_instance(WEBDRIVER, Arc::clone(&driver) as Component);
        registry.add_shared_instance(TRANSLATOR, Arc::clone(&translator) as Component);
        registry.add_shared_instance(CONFIGURATION, Arc::new(config.clone()) as Component);

        let locators = LocatorStrategy::new(Arc::clone(&translator) as Arc<dyn Translator>);
        let theme = config.theme.clone();

        let context = Self {
            config,
            namespaces: RwLock::new(namespaces),
            registry,
            driver,
            translator,
            locators,
            post_callbacks: Mutex::new(Vec::new()),
            torn_down: AtomicBool::new(false),
        };

        if let Some(theme) = theme {
            context.switch_theme_configuration(&theme)?;
        }

        info!("Test context ready ({} namespaces)", context.namespaces().len());
        Ok(context)
    }

    /// Run `body` with this context, then tear it down on every exit path.
    ///
    /// A panic inside `body` is resumed once teardown has finished.
    pub async fn run<F, Fut, T>(self, body: F) -> Result<T>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let context = Arc::new(self);
        let outcome = AssertUnwindSafe(body(Arc::clone(&context)))
            .catch_unwind()
            .await;
        let cleanup = context.teardown().await;

        match outcome {
            Ok(result) => {
                let value = result?;
                cleanup?;
                Ok(value)
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Run post-test callbacks, drop cached components and close the driver.
    ///
    /// Only the first call does anything. A panicking callback does not stop the
    /// rest of the cleanup; its panic is resumed once the driver is closed.
    pub async fn teardown(&self) -> Result<()> {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let callbacks: Vec<PostTestCallback> = std::mem::take(&mut *self.lock_callbacks());
        debug!("Running {} post-test callbacks", callbacks.len());
        let mut panicked = None;
        for callback in callbacks {
            if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(callback)) {
                warn!("Post-test callback panicked");
                panicked.get_or_insert(payload);
            }
        }

        self.registry.clear();
        info!("Closing test context");
        let closed = self.driver.close().await;

        // The session is closed; the first callback panic still fails the test
        if let Some(payload) = panicked {
            std::panic::resume_unwind(payload);
        }
        closed
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn lock_callbacks(&self) -> std::sync::MutexGuard<'_, Vec<PostTestCallback>> {
        self.post_callbacks.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn config(&self) -> &TestCaseConfiguration {
        &self.config
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn translator(&self) -> &Arc<PlaceholderTranslator> {
        &self.translator
    }

    pub fn add_translation_file(&self, path: &Path, locale: &str) -> Result<usize> {
        self.translator.load_json_file(path, locale)
    }

    /// Snapshot of the namespace search list
    pub fn namespaces(&self) -> NamespaceResolver {
        self.namespaces.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn register_namespace(&self, namespace: &str) {
        self.namespaces
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register(namespace);
    }

    /// Resolve `name` under `prefix` against the registered namespaces
    pub fn resolve(&self, name: &str, prefix: Option<&str>) -> String {
        self.namespaces
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .resolve(name, prefix, |id| self.registry.exists(id))
    }

    // Component lookup

    pub fn get(&self, identifier: &str) -> Result<Component> {
        self.registry.get(identifier)
    }

    pub fn get_as<T: Any + Send + Sync>(&self, identifier: &str) -> Result<Arc<T>> {
        self.registry.get_as::<T>(identifier)
    }

    /// The active theme, or the named one
    pub fn get_theme(&self, theme: Option<&str>) -> Result<Arc<dyn ThemeConfiguration>> {
        match theme {
            None => self.registry.get_theme(THEME_CONFIGURATION),
            Some(name) => self.registry.get_theme(&self.resolve(name, Some("Themes"))),
        }
    }

    /// The named theme as its concrete type
    pub fn get_theme_as<T: Any + Send + Sync>(&self, theme: &str) -> Result<Arc<T>> {
        self.get_as::<T>(&self.resolve(theme, Some("Themes")))
    }

    pub fn get_action<T: Any + Send + Sync>(&self, action: &str) -> Result<Arc<T>> {
        self.get_as::<T>(&self.resolve(action, Some("Actions")))
    }

    pub fn get_identity<T: Any + Send + Sync>(&self, identity: Option<&str>) -> Result<Arc<T>> {
        self.get_as::<T>(&self.resolve(identity.unwrap_or("Customer"), Some("Identities")))
    }

    pub fn get_navigator<T: Any + Send + Sync>(&self, navigator: Option<&str>) -> Result<Arc<T>> {
        self.get_as::<T>(&self.resolve(navigator.unwrap_or("BaseMenu"), Some("Navigators")))
    }

    pub fn get_assertion<T: Any + Send + Sync>(&self, assertion: &str) -> Result<Arc<T>> {
        self.get_as::<T>(&self.resolve(assertion, Some("Assertions")))
    }

    pub fn get_extractor<T: Any + Send + Sync>(&self, extractor: &str) -> Result<Arc<T>> {
        self.get_as::<T>(&self.resolve(extractor, Some("Extractors")))
    }

    /// Serve requests for `abstract_type` from `preference` from now on
    pub fn set_type_preference(&self, abstract_type: &str, preference: &str) {
        let abstract_type = self.resolve(abstract_type, None);
        let preference = self.resolve(preference, None);
        self.registry.set_preference(&abstract_type, &preference);
    }

    /// Make `theme` the active theme configuration and let it configure the context
    pub fn switch_theme_configuration(&self, theme: &str) -> Result<()> {
        let identifier = self.resolve(theme, Some("Themes"));
        let kind = self.registry.kind(&identifier);

        if !kind.is_some_and(|k| k.is_theme()) {
            return Err(PageprobeError::InvalidConfiguration(format!(
                "'{}' is not a registered theme configuration",
                identifier
            )));
        }

        self.registry.set_preference(THEME_CONFIGURATION, &identifier);
        if kind == Some(ComponentKind::BaseTheme) {
            self.registry.set_preference(BASE_THEME, &identifier);
        }
        // Built-ins capture the theme at construction
        self.registry.invalidate(AdminLogin::<D>::ID);
        self.registry.invalidate(AdminMenu::<D>::ID);

        let active = self.get_theme(None)?;
        info!("Switched to {} theme ({})", active.name(), identifier);
        active.configure(&self.registry)
    }

    /// Run `callback` during teardown
    pub fn add_post_test_callback<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.lock_callbacks().push(Box::new(callback));
    }

    /// Sleep for a duration written as `1s`, `250ms`, `10us` or `5ns`
    pub async fn sleep(&self, time: &str) -> Result<()> {
        let duration = parse_sleep(time)?;
        debug!("Sleeping for {:?}", duration);
        tokio::time::sleep(duration).await;
        Ok(())
    }

    pub async fn command_open(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await
    }

    // Element lookup

    pub async fn locate(&self, request: &LocatorRequest) -> Result<D::Element> {
        self.locators.locate(self.driver.as_ref(), request).await
    }

    pub async fn by_id(&self, id: &str) -> Result<D::Element> {
        self.locate(&LocatorRequest::id(id)).await
    }

    pub async fn by_css_selector(&self, selector: &str) -> Result<D::Element> {
        self.locate(&LocatorRequest::css(selector)).await
    }

    pub async fn by_xpath(&self, xpath: &str) -> Result<D::Element> {
        self.locate(&LocatorRequest::xpath(xpath)).await
    }

    pub async fn by_text(
        &self,
        text: &str,
        node_type: Option<&str>,
        parent: Option<&str>,
    ) -> Result<D::Element> {
        self.locate(&text_request(By::Text, text, node_type, parent)).await
    }

    pub async fn by_contains_text(
        &self,
        text: &str,
        node_type: Option<&str>,
        parent: Option<&str>,
    ) -> Result<D::Element> {
        self.locate(&text_request(By::ContainsText, text, node_type, parent))
            .await
    }

    // Assertions

    pub async fn assert_element_exists(&self, selector: &str, by: By) -> Result<()> {
        match self.locate(&LocatorRequest::new(by, selector)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => fail(format!(
                "Element \"{}\" cannot be found using selector \"{}\": {}",
                selector, by, e
            )),
            Err(e) => Err(e),
        }
    }

    pub async fn assert_element_not_exists(&self, selector: &str, by: By) -> Result<()> {
        match self.locate(&LocatorRequest::new(by, selector)).await {
            Ok(_) => fail(format!(
                "Element \"{}\" was found using selector \"{}\"",
                selector, by
            )),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn assert_element_displayed(&self, selector: &str, by: By) -> Result<()> {
        if !self.element_displayed(selector, by).await? {
            return fail(format!(
                "The element: {}, located with {}, is not displayed and it should have been",
                selector, by
            ));
        }
        Ok(())
    }

    pub async fn assert_element_not_displayed(&self, selector: &str, by: By) -> Result<()> {
        if self.element_displayed(selector, by).await? {
            return fail(format!(
                "The element: {}, located with {}, is displayed and it should not have been",
                selector, by
            ));
        }
        Ok(())
    }

    async fn element_displayed(&self, selector: &str, by: By) -> Result<bool> {
        let element = match self.locate(&LocatorRequest::new(by, selector)).await {
            Ok(element) => element,
            Err(e) if e.is_not_found() => {
                return fail(format!(
                    "Element \"{}\" cannot be found using selector \"{}\"",
                    selector, by
                ));
            }
            Err(e) => return Err(e),
        };
        self.driver.is_displayed(&element).await
    }

    pub async fn assert_element_clickable(&self, selector: &str, by: By) -> Result<()> {
        if !self.element_clickable(selector, by).await? {
            return fail(format!(
                "The element {}, located with {}, cannot be clicked",
                selector, by
            ));
        }
        Ok(())
    }

    pub async fn assert_element_not_clickable(&self, selector: &str, by: By) -> Result<()> {
        if self.element_clickable(selector, by).await? {
            return fail(format!(
                "The element {}, located with {}, is clickable but should not be",
                selector, by
            ));
        }
        Ok(())
    }

    /// Whether the element becomes clickable within the configured wait timeout
    async fn element_clickable(&self, selector: &str, by: By) -> Result<bool> {
        let request = LocatorRequest::new(by, selector);
        let query = match self.locators.resolve_query(self.driver.as_ref(), &request).await {
            Ok(query) => query,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };

        match self
            .driver
            .wait_until_clickable(&query, self.config.wait_timeout())
            .await
        {
            Ok(_) => Ok(true),
            Err(PageprobeError::Timeout(_)) => Ok(false),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn assert_title_equals(&self, title: &str) -> Result<()> {
        let actual = self.driver.title().await?;
        check(actual == title, || {
            format!("Expected title \"{}\" but the page title is \"{}\"", title, actual)
        })
    }

    pub async fn assert_title_contains(&self, title: &str) -> Result<()> {
        let actual = self.driver.title().await?;
        check(actual.contains(title), || {
            format!("The page title \"{}\" does not contain \"{}\"", actual, title)
        })
    }

    pub async fn assert_not_title_equals(&self, title: &str) -> Result<()> {
        let actual = self.driver.title().await?;
        check(actual != title, || format!("The page title is \"{}\"", title))
    }

    pub async fn assert_not_title_contains(&self, title: &str) -> Result<()> {
        let actual = self.driver.title().await?;
        check(!actual.contains(title), || {
            format!("The page title \"{}\" contains \"{}\"", actual, title)
        })
    }

    pub async fn assert_url_equals(&self, url: &str) -> Result<()> {
        let actual = self.driver.current_url().await?;
        check(actual == url, || {
            format!("Expected URL \"{}\" but the current URL is \"{}\"", url, actual)
        })
    }

    pub async fn assert_url_contains(&self, url: &str) -> Result<()> {
        let actual = self.driver.current_url().await?;
        check(actual.contains(url), || {
            format!("The current URL \"{}\" does not contain \"{}\"", actual, url)
        })
    }

    pub async fn assert_url_not_equals(&self, url: &str) -> Result<()> {
        let actual = self.driver.current_url().await?;
        check(actual != url, || format!("The current URL is \"{}\"", url))
    }

    pub async fn assert_url_not_contains(&self, url: &str) -> Result<()> {
        let actual = self.driver.current_url().await?;
        check(!actual.contains(url), || {
            format!("The current URL \"{}\" contains \"{}\"", actual, url)
        })
    }

    pub async fn assert_page_has_text(&self, text: &str) -> Result<()> {
        match self.by_xpath(&body_text_xpath(text)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => fail(format!("The body did not contain the text: {}", text)),
            Err(e) => Err(e),
        }
    }

    pub async fn assert_page_not_has_text(&self, text: &str) -> Result<()> {
        match self.by_xpath(&body_text_xpath(text)).await {
            Ok(_) => fail(format!("The page contains the words: {}", text)),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn assert_element_has_text(&self, node: &str, text: &str) -> Result<()> {
        let xpath = format!("//{}[contains(., {})]", node, xpath_literal(text));
        match self.by_xpath(&xpath).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                fail(format!("No {} element contained the text: {}", node, text))
            }
            Err(e) => Err(e),
        }
    }
}

impl<D: Driver> Drop for TestContext<D> {
    fn drop(&mut self) {
        if !self.is_torn_down() {
            warn!("Test context dropped without teardown; the browser session stays open");
        }
    }
}

fn text_request(by: By, text: &str, node_type: Option<&str>, parent: Option<&str>) -> LocatorRequest {
    let mut request = LocatorRequest::new(by, text);
    if let Some(node_type) = node_type {
        request = request.with_node_type(node_type);
    }
    if let Some(parent) = parent {
        request = request.within(parent);
    }
    request
}

fn body_text_xpath(text: &str) -> String {
    format!("//body[contains(., {})]", xpath_literal(text))
}

fn fail<T>(message: String) -> Result<T> {
    Err(PageprobeError::AssertionFailed(message))
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition { Ok(()) } else { fail(message()) }
}

/// Parse `1s`, `250ms`, `10us` or `5ns`; a bare number is seconds
pub fn parse_sleep(time: &str) -> Result<Duration> {
    let time = time.trim();
    let split = time
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(time.len());
    let (amount, unit) = time.split_at(split);

    let amount: u64 = amount.parse().map_err(|_| {
        PageprobeError::InvalidConfiguration(format!("Invalid sleep duration: '{}'", time))
    })?;

    match unit.trim() {
        "" | "s" => Ok(Duration::from_secs(amount)),
        "ms" => Ok(Duration::from_millis(amount)),
        "us" => Ok(Duration::from_micros(amount)),
        "ns" => Ok(Duration::from_nanos(amount)),
        other => Err(PageprobeError::InvalidConfiguration(format!(
            "Unknown sleep unit '{}' in '{}'",
            other, time
        ))),
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
