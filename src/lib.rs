//! # pageprobe
#![allow(clippy::uninlined_format_args)]
//!
//! Page-object acceptance testing over WebDriver.
//!
//! Tests ask for themes, actions and navigators by short name. The
//! [`TestContext`] resolves those names against an ordered list of
//! namespaces, constructs the component through the [`ComponentRegistry`]
//! and caches it for the rest of the test. Elements are found through the
//! [`LocatorStrategy`], which turns id, css, xpath and text requests into
//! WebDriver queries.
//!
//! ## Namespaces
//!
//! A short name such as `Admin` requested under the `Themes` prefix is tried
//! as `{namespace}.Themes.Admin` for every registered namespace in
//! registration order. Configured namespaces come first, the built-in
//! `Pageprobe` namespace last, so a project can override any shipped
//! component by registering its own under the same relative name.
//!
//! ## Text locators
//!
//! A text request without a node type probes `h1`, `h2`, `h3`, `span`, `a`,
//! `li`, `label` and `option` in that order and returns the first match.
//! `{{placeholders}}` in the text are translated for the configured locale
//! before every probe.
//!
//! ## Configuration
//!
//! Settings are merged from the `*.json` files of the nearest `configuration/`
//! directory and overridden by `PAGEPROBE_BROWSER`, `PAGEPROBE_WEBDRIVER_URL`
//! and `PAGEPROBE_HEADLESS`.
//!
//! ## Usage
//!
//! ```no_run
//! use pageprobe::{AdminLogin, Browser, TestCaseConfiguration, TestContext};
//!
//! # async fn example() -> pageprobe::Result<()> {
//! pageprobe::logging::init();
//! let config = TestCaseConfiguration::load()?;
//! let context = TestContext::launch(config).await?;
//!
//! context
//!     .run(|ctx| async move {
//!         ctx.command_open("http://localhost/admin").await?;
//!         ctx.get_action::<AdminLogin<Browser>>("AdminLogin")?
//!             .login("admin", "password123")
//!             .await?;
//!         ctx.assert_page_has_text("Dashboard").await
//!     })
//!     .await
//! # }
//! ```

/// Admin actions built on theme locators
pub mod actions;

/// Configuration discovery and environment overrides
pub mod config;

/// Per-test context: lookup, locators, assertions and teardown
pub mod context;

/// Browser seam and in-memory test double
pub mod driver;

/// Error types
pub mod errors;

/// Locator requests and strategies
pub mod locator;

/// Tracing subscriber setup
pub mod logging;

/// Short-name resolution over registered namespaces
pub mod namespace;

/// Menu navigation
pub mod navigators;

/// Component registry, type preferences and shared instances
pub mod registry;

/// Theme configurations
pub mod themes;

/// Placeholder translation
pub mod translator;

/// fantoccini-backed driver
pub mod webdriver;

pub use actions::AdminLogin;
pub use config::{TestCaseConfiguration, TranslationSource, ViewportSize};
pub use context::TestContext;
pub use driver::{Driver, MockDriver, MockElement, MockHandle};
pub use errors::{PageprobeError, Result};
pub use locator::{By, LocatorRequest, LocatorStrategy, Query};
pub use namespace::{BASE_NAMESPACE, NamespaceResolver};
pub use navigators::AdminMenu;
pub use registry::{Component, ComponentKind, ComponentRegistry, Container};
pub use themes::{AdminThemeConfiguration, ThemeConfiguration};
pub use translator::{NoopTranslator, PlaceholderTranslator, Translator};
pub use webdriver::{Browser, BrowserType};
