//! Headless browser client for the vendor panel
//!
//! This module is the boundary to the page-rendering automation backend.
//! The panel state machine only ever talks to the [`PanelDriver`] trait,
//! which models the small capability set the scrape needs: navigate to a
//! URL, locate an element, read its text or a computed CSS property, click
//! it, and wait for it to appear, each with its own failure signal.
//! [`HeadlessPanel`] implements the trait on top of a headless Chromium
//! instance driven over CDP.

use crate::error::{HestiaError, Result};
use crate::logging::get_logger;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// How to find one element on the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// By element id
    Id(String),
    /// By CSS selector
    Css(String),
    /// By exact anchor text
    LinkText(String),
    /// By tag name (first match)
    Tag(String),
    /// By XPath expression
    XPath(String),
}

impl Locator {
    pub fn id(value: &str) -> Self {
        Locator::Id(value.to_string())
    }

    pub fn css(value: &str) -> Self {
        Locator::Css(value.to_string())
    }

    pub fn link_text(value: &str) -> Self {
        Locator::LinkText(value.to_string())
    }

    pub fn tag(value: &str) -> Self {
        Locator::Tag(value.to_string())
    }

    pub fn xpath(value: &str) -> Self {
        Locator::XPath(value.to_string())
    }

    /// JavaScript expression evaluating to the element or `null`
    fn js_lookup(&self) -> String {
        match self {
            Locator::Id(v) => format!("document.getElementById({})", js_quote(v)),
            Locator::Css(v) => format!("document.querySelector({})", js_quote(v)),
            Locator::LinkText(v) => format!(
                "(Array.from(document.getElementsByTagName(\"a\")).find((el) => el.textContent.trim() === {}) || null)",
                js_quote(v)
            ),
            Locator::Tag(v) => format!(
                "(document.getElementsByTagName({})[0] || null)",
                js_quote(v)
            ),
            Locator::XPath(v) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_quote(v)
            ),
        }
    }

    /// JavaScript expression evaluating to the number of matches
    fn js_count(&self) -> String {
        match self {
            Locator::Id(v) => format!("(document.getElementById({}) ? 1 : 0)", js_quote(v)),
            Locator::Css(v) => format!("document.querySelectorAll({}).length", js_quote(v)),
            Locator::LinkText(v) => format!(
                "Array.from(document.getElementsByTagName(\"a\")).filter((el) => el.textContent.trim() === {}).length",
                js_quote(v)
            ),
            Locator::Tag(v) => format!("document.getElementsByTagName({}).length", js_quote(v)),
            Locator::XPath(v) => format!(
                "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                js_quote(v)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
            Locator::LinkText(v) => write!(f, "link_text={}", v),
            Locator::Tag(v) => write!(f, "tag={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
        }
    }
}

/// Quote a string for embedding into a JavaScript expression
fn js_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// The capability set the panel state machine needs from the automation
/// backend. Exclusive (`&mut self`) by design: one scrape at a time.
#[async_trait]
pub trait PanelDriver: Send {
    /// Load a URL
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Wait for an element to be present in the DOM
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Wait for an element to be present and rendered visible
    async fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Read an element's text content
    async fn text(&mut self, locator: &Locator) -> Result<String>;

    /// Read a computed CSS property of an element
    async fn css_value(&mut self, locator: &Locator, property: &str) -> Result<String>;

    /// Type text into an input element
    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<()>;

    /// Click an element; fails when missing or not interactable
    async fn click(&mut self, locator: &Locator) -> Result<()>;

    /// Number of elements matching the locator
    async fn count(&mut self, locator: &Locator) -> Result<usize>;

    /// Run a script on the current page, discarding its result
    async fn eval(&mut self, script: &str) -> Result<()>;

    /// Tear down the underlying browser
    async fn close(&mut self) -> Result<()>;
}

/// Launches fresh driver instances; the session re-launches after teardown
#[async_trait]
pub trait DriverFactory: Send {
    async fn launch(&self) -> Result<Box<dyn PanelDriver>>;
}

/// Probe outcome for one element
enum Presence {
    Missing,
    Hidden,
    Visible,
}

/// Headless Chromium implementation of [`PanelDriver`]
pub struct HeadlessPanel {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
    poll_interval: Duration,
    logger: crate::logging::StructuredLogger,
}

impl HeadlessPanel {
    /// Launch a headless browser using the given executable
    pub async fn launch(exec_path: &str, poll_interval: Duration) -> Result<Self> {
        let logger = get_logger("browser");

        let config = BrowserConfig::builder()
            .chrome_executable(exec_path)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(HestiaError::browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| HestiaError::browser(format!("Failed to launch browser: {}", e)))?;

        // The handler drives the CDP connection; it must be polled for the
        // browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HestiaError::browser(format!("Failed to open page: {}", e)))?;

        logger.info("Browser launched");

        Ok(Self {
            browser,
            page,
            handler_task,
            poll_interval,
            logger,
        })
    }

    /// Evaluate a JavaScript expression and deserialize its result
    async fn eval_value<T: DeserializeOwned>(&self, expr: &str) -> Result<T> {
        let result = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| HestiaError::browser(format!("Script evaluation failed: {}", e)))?;
        result
            .into_value::<T>()
            .map_err(|e| HestiaError::browser(format!("Unexpected script result: {}", e)))
    }

    /// Check presence and visibility of an element
    async fn probe(&self, locator: &Locator) -> Result<Presence> {
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return \"missing\"; \
             const rect = el.getBoundingClientRect(); \
             const style = window.getComputedStyle(el); \
             if (rect.width === 0 || rect.height === 0 || \
                 style.visibility === \"hidden\" || style.display === \"none\") return \"hidden\"; \
             return \"visible\"; }})()",
            locator.js_lookup()
        );
        let state: String = self.eval_value(&expr).await?;
        match state.as_str() {
            "missing" => Ok(Presence::Missing),
            "hidden" => Ok(Presence::Hidden),
            _ => Ok(Presence::Visible),
        }
    }

    /// Poll until the probe passes `accept` or the timeout elapses
    async fn wait_until<F>(&self, locator: &Locator, timeout: Duration, accept: F) -> Result<()>
    where
        F: Fn(&Presence) -> bool + Send,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if accept(&self.probe(locator).await?) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HestiaError::timeout(format!(
                    "Timeout waiting for {}",
                    locator
                )));
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PanelDriver for HeadlessPanel {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.logger.debug(&format!("Loading {}", url));
        self.page
            .goto(url)
            .await
            .map_err(|e| HestiaError::navigation(format!("Unable to reach URL {}: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.wait_until(locator, timeout, |p| !matches!(p, Presence::Missing))
            .await
    }

    async fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.wait_until(locator, timeout, |p| matches!(p, Presence::Visible))
            .await
    }

    async fn text(&mut self, locator: &Locator) -> Result<String> {
        let expr = format!(
            "(() => {{ const el = {}; return el ? el.textContent.trim() : null; }})()",
            locator.js_lookup()
        );
        let value: Option<String> = self.eval_value(&expr).await?;
        value.ok_or_else(|| HestiaError::not_found(locator.to_string()))
    }

    async fn css_value(&mut self, locator: &Locator, property: &str) -> Result<String> {
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return null; \
             return window.getComputedStyle(el).getPropertyValue({}); }})()",
            locator.js_lookup(),
            js_quote(property)
        );
        let value: Option<String> = self.eval_value(&expr).await?;
        match value {
            Some(v) if !v.is_empty() => Ok(v),
            // Element absent, or the property is not set on it
            _ => Err(HestiaError::not_found(locator.to_string())),
        }
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<()> {
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return \"missing\"; \
             el.value = {}; \
             el.dispatchEvent(new Event(\"input\", {{ bubbles: true }})); \
             el.dispatchEvent(new Event(\"change\", {{ bubbles: true }})); \
             return \"ok\"; }})()",
            locator.js_lookup(),
            js_quote(text)
        );
        let state: String = self.eval_value(&expr).await?;
        if state == "missing" {
            return Err(HestiaError::not_found(locator.to_string()));
        }
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        match self.probe(locator).await? {
            Presence::Missing => return Err(HestiaError::not_found(locator.to_string())),
            Presence::Hidden => return Err(HestiaError::not_interactable(locator.to_string())),
            Presence::Visible => {}
        }
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return \"missing\"; el.click(); return \"ok\"; }})()",
            locator.js_lookup()
        );
        let state: String = self.eval_value(&expr).await?;
        if state == "missing" {
            return Err(HestiaError::not_found(locator.to_string()));
        }
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize> {
        let n: u64 = self.eval_value(&locator.js_count()).await?;
        Ok(n as usize)
    }

    async fn eval(&mut self, script: &str) -> Result<()> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| HestiaError::browser(format!("Script evaluation failed: {}", e)))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            self.logger.warn(&format!("Browser close failed: {}", e));
        }
        self.handler_task.abort();
        self.logger.info("Browser stopped");
        Ok(())
    }
}

/// [`DriverFactory`] producing [`HeadlessPanel`] instances
pub struct ChromeLauncher {
    exec_path: String,
    poll_interval: Duration,
}

impl ChromeLauncher {
    pub fn new(exec_path: &str, poll_interval: Duration) -> Self {
        Self {
            exec_path: exec_path.to_string(),
            poll_interval,
        }
    }
}

#[async_trait]
impl DriverFactory for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn PanelDriver>> {
        let driver = HeadlessPanel::launch(&self.exec_path, self.poll_interval).await?;
        Ok(Box::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_display() {
        assert_eq!(Locator::id("path7").to_string(), "id=path7");
        assert_eq!(Locator::css(".ui-body").to_string(), "css=.ui-body");
        assert_eq!(Locator::link_text("zaloguj").to_string(), "link_text=zaloguj");
    }

    #[test]
    fn js_quote_escapes() {
        assert_eq!(js_quote("plain"), "\"plain\"");
        assert_eq!(js_quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn lookup_expressions() {
        let by_id = Locator::id("login").js_lookup();
        assert!(by_id.contains("getElementById(\"login\")"));

        let by_xpath = Locator::xpath("//*[@id=\"params\"]/div[1]/a[2]").js_lookup();
        assert!(by_xpath.contains("document.evaluate"));
        assert!(by_xpath.contains("FIRST_ORDERED_NODE_TYPE"));
    }

    #[test]
    fn count_expressions() {
        let by_tag = Locator::tag("li").js_count();
        assert!(by_tag.contains("getElementsByTagName(\"li\").length"));

        let by_id = Locator::id("start").js_count();
        assert!(by_id.contains("? 1 : 0"));
    }
}
