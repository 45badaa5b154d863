//! Navigation and readout state machine for the vendor panel
//!
//! [`PanelSession`] owns the automation driver's lifecycle and walks the
//! panel the way a user would: log in, pick the appliance and its
//! management module, read the home-page status icons and settings, open
//! the parameters view, read it, and return to the home page so the next
//! cycle starts from a known place.
//!
//! Failure policy: navigation anchors (login form, device list, module
//! marker, home marker, parameters control, the post-read home
//! confirmation) are hard: the cycle aborts and the driver is torn down.
//! Data-bearing leaf elements (status colors, settings, parameter values)
//! are soft: a missing one degrades only its own key.

use crate::browser::{DriverFactory, PanelDriver};
use crate::config::{PanelConfig, TimeoutsConfig};
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;
use crate::readout::colors;
use std::collections::HashMap;
use std::time::Duration;

/// Status icons on the home page; the icon's fill color carries the state
pub const STATUS_KEYS: [&str; 6] = [
    "radiator", // central heating
    "tap",      // tap water heating
    "clock",    // timer programs
    "pump",     // circulation pump
    "error",    // fault indicator
    "suitcase", // holiday mode
];

/// Programmed settings shown on the home page
pub const SETTING_KEYS: [&str; 2] = [
    "temp_prog",    // programmed room temperature
    "temp_zas_nas", // programmed tap water temperature
];

/// Fields on the parameters page
pub const PARAM_KEYS: [&str; 9] = [
    "params_temp_in",      // inlet temperature
    "params_temp_out",     // outlet temperature
    "params_temp_factor",  // heating factor setpoint
    "params_temp_room",    // room temperature
    "params_temp_outside", // outside temperature
    "params_temp_boil",    // tank temperature
    "params_power",        // engaged power
    "params_preasure",     // pressure (vendor's spelling)
    "params_flow",         // flow
];

/// Placeholder recorded for a parameter that could not be read
pub const PARAM_MISSING: &str = "---";

/// Fixed locator table for the vendor UI contract. Everything the state
/// machine touches on the panel is named here and nowhere else.
mod ui {
    use crate::browser::Locator;

    pub fn login_field() -> Locator {
        Locator::id("login")
    }

    pub fn password_field() -> Locator {
        Locator::id("pass")
    }

    pub fn login_submit() -> Locator {
        Locator::link_text("zaloguj")
    }

    pub fn device_list() -> Locator {
        Locator::css(".ui-body")
    }

    pub fn device_entry() -> Locator {
        Locator::tag("li")
    }

    pub fn module_marker() -> Locator {
        Locator::id("start")
    }

    /// The home-page "house" image; its presence means a live session
    pub fn home_marker() -> Locator {
        Locator::id("path7")
    }

    pub fn params_open() -> Locator {
        Locator::id("parameters_lbl_")
    }

    /// First parameter cell; used as the readiness marker for the view
    pub fn params_ready() -> Locator {
        Locator::id("params_temp_in")
    }

    pub fn params_back() -> Locator {
        Locator::xpath("//*[@id=\"params\"]/div[1]/a[2]")
    }

    pub fn status_icon(key: &str) -> Locator {
        Locator::id(&format!("{}_", key))
    }

    pub fn setting_field(key: &str) -> Locator {
        Locator::id(key)
    }

    pub fn param_field(key: &str) -> Locator {
        Locator::id(key)
    }

    /// Scripted selection of the management module; both arguments are part
    /// of the fixed vendor contract.
    pub const MODULE_SELECT: &str = "loadModule('101','19');";
}

/// Raw status icon colors, keyed by status key
pub type RawStatusSet = HashMap<&'static str, String>;

/// Raw parameter texts, keyed by parameter key
pub type RawParamsSet = HashMap<&'static str, String>;

/// Raw setting texts, keyed by setting key; absent elements omit the key
pub type RawSettingsSet = HashMap<&'static str, String>;

/// Wrap an anchor failure into the hard navigation error that aborts the
/// cycle; unexpected driver errors pass through untouched.
fn hard_failure(step: &str, err: HestiaError) -> HestiaError {
    match err {
        HestiaError::Timeout { .. }
        | HestiaError::ElementNotFound { .. }
        | HestiaError::NotInteractable { .. } => {
            HestiaError::navigation(format!("{}: {}", step, err))
        }
        other => other,
    }
}

/// One authenticated scraping session against the vendor panel
pub struct PanelSession {
    url: String,
    username: String,
    password: String,
    element_timeout: Duration,
    params_timeout: Duration,
    factory: Box<dyn DriverFactory>,
    driver: Option<Box<dyn PanelDriver>>,
    logged_in: bool,
    logger: crate::logging::StructuredLogger,
}

impl PanelSession {
    /// Create a session; the driver is launched lazily on first collect
    pub fn new(
        panel: &PanelConfig,
        timeouts: &TimeoutsConfig,
        factory: Box<dyn DriverFactory>,
    ) -> Self {
        Self {
            url: panel.url.clone(),
            username: panel.username.clone(),
            password: panel.password.clone(),
            element_timeout: Duration::from_secs(timeouts.element_secs),
            params_timeout: Duration::from_secs(timeouts.params_secs),
            factory,
            driver: None,
            logged_in: false,
            logger: get_logger("panel"),
        }
    }

    /// Whether the last cycle left a live panel session behind
    pub fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    /// Run one full collection cycle.
    ///
    /// Re-logins transparently when the session has expired. On any hard
    /// failure the driver is torn down before the error is returned, so the
    /// next call rebuilds the session from scratch.
    pub async fn collect(&mut self) -> Result<(RawStatusSet, RawParamsSet, RawSettingsSet)> {
        self.ensure_driver().await?;

        let result = self.collect_inner().await;
        match result {
            Ok(readouts) => Ok(readouts),
            Err(e) => {
                self.stop().await;
                Err(e)
            }
        }
    }

    async fn collect_inner(&mut self) -> Result<(RawStatusSet, RawParamsSet, RawSettingsSet)> {
        // A present home marker means the previous session is still live
        self.logged_in = self.on_home_page().await;

        if !self.logged_in {
            self.login_and_navigate().await?;
            self.logged_in = true;
        }

        let statuses = self.read_status().await?;
        let settings = self.read_settings().await?;
        self.goto_params_page().await?;
        let params = self.read_params().await?;
        self.back_to_main().await?;

        Ok((statuses, params, settings))
    }

    /// Tear down the driver. Idempotent; safe after partial failures.
    pub async fn stop(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(e) = driver.close().await {
                self.logger.warn(&format!("Driver teardown reported: {}", e));
            }
        }
        self.logged_in = false;
    }

    async fn ensure_driver(&mut self) -> Result<()> {
        if self.driver.is_none() {
            self.logger.info("Launching automation driver");
            self.driver = Some(self.factory.launch().await?);
            self.logged_in = false;
        }
        Ok(())
    }

    fn driver(&mut self) -> Result<&mut dyn PanelDriver> {
        match self.driver.as_deref_mut() {
            Some(driver) => Ok(driver),
            None => Err(HestiaError::browser("Driver not initialized")),
        }
    }

    async fn on_home_page(&mut self) -> bool {
        // Any failure counts as "not on the home page", including a session
        // the browser has silently dropped.
        match self.driver.as_deref_mut() {
            Some(driver) => matches!(driver.count(&ui::home_marker()).await, Ok(n) if n > 0),
            None => false,
        }
    }

    /// Full authentication sub-flow: login page to home page
    async fn login_and_navigate(&mut self) -> Result<()> {
        self.logger.info("Authenticating at the panel");
        self.login().await?;
        self.goto_device().await?;
        self.goto_module().await?;
        self.await_home().await.map_err(|e| match e {
            HestiaError::Timeout { .. } => {
                HestiaError::auth("Logged in but the home page never appeared")
            }
            other => other,
        })
    }

    async fn login(&mut self) -> Result<()> {
        let url = self.url.clone();
        let username = self.username.clone();
        let password = self.password.clone();
        let timeout = self.element_timeout;
        let driver = self.driver()?;

        driver.goto(&url).await?;

        driver
            .wait_for(&ui::login_field(), timeout)
            .await
            .map_err(|e| hard_failure("Login field never appeared", e))?;
        driver
            .wait_for(&ui::password_field(), timeout)
            .await
            .map_err(|e| hard_failure("Password field never appeared", e))?;

        driver
            .fill(&ui::login_field(), &username)
            .await
            .map_err(|e| hard_failure("Login field rejected input", e))?;
        driver
            .fill(&ui::password_field(), &password)
            .await
            .map_err(|e| hard_failure("Password field rejected input", e))?;

        // The submit link must be present and clickable; anything else
        // aborts the whole sequence.
        driver
            .click(&ui::login_submit())
            .await
            .map_err(|e| hard_failure("Login submit control unusable", e))
    }

    /// Select the appliance after login. The account is assumed to hold a
    /// single device; the first entry is always taken.
    async fn goto_device(&mut self) -> Result<()> {
        let timeout = self.element_timeout;
        let driver = self.driver()?;

        driver
            .wait_for(&ui::device_list(), timeout)
            .await
            .map_err(|e| hard_failure("Device list never appeared", e))?;

        let entries = driver.count(&ui::device_entry()).await?;
        if entries == 0 {
            return Err(HestiaError::navigation("No device available to select"));
        }

        driver
            .click(&ui::device_entry())
            .await
            .map_err(|e| hard_failure("Device entry not clickable", e))
    }

    /// Enter the management module of the selected device
    async fn goto_module(&mut self) -> Result<()> {
        let timeout = self.element_timeout;
        let driver = self.driver()?;

        driver
            .wait_for(&ui::module_marker(), timeout)
            .await
            .map_err(|e| hard_failure("Module selection never appeared", e))?;

        driver.eval(ui::MODULE_SELECT).await
    }

    async fn await_home(&mut self) -> Result<()> {
        let timeout = self.element_timeout;
        self.driver()?.wait_for(&ui::home_marker(), timeout).await
    }

    /// Read the home-page status icons. Each icon is individually optional;
    /// an unreadable one records the black sentinel instead of failing.
    async fn read_status(&mut self) -> Result<RawStatusSet> {
        let mut status = RawStatusSet::new();
        for key in STATUS_KEYS {
            let icon = ui::status_icon(key);
            let result = self.driver()?.css_value(&icon, "fill").await;
            let read = match result {
                Ok(color) => color,
                Err(e) if e.is_soft() => {
                    self.logger
                        .warn(&format!("Status icon {} unreadable: {}", key, e));
                    colors::BLACK.to_string()
                }
                Err(e) => return Err(e),
            };
            status.insert(key, read);
        }
        Ok(status)
    }

    /// Read the home-page settings. A missing field omits its key.
    async fn read_settings(&mut self) -> Result<RawSettingsSet> {
        let mut settings = RawSettingsSet::new();
        for key in SETTING_KEYS {
            let result = self.driver()?.text(&ui::setting_field(key)).await;
            match result {
                Ok(text) => {
                    settings.insert(key, text);
                }
                Err(e) if e.is_soft() => {
                    self.logger.debug(&format!("Setting {} not present", key));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(settings)
    }

    /// Open the parameters view. The table is in the DOM from the start but
    /// its values only populate once the view is opened, so the readiness
    /// wait uses the longer timeout.
    async fn goto_params_page(&mut self) -> Result<()> {
        self.driver()?
            .click(&ui::params_open())
            .await
            .map_err(|e| hard_failure("Error entering params page", e))?;

        let timeout = self.params_timeout;
        self.driver()?
            .wait_visible(&ui::params_ready(), timeout)
            .await
            .map_err(|e| hard_failure("Timeout when opening params page", e))
    }

    /// Read the parameter fields. A missing one records `"---"`.
    async fn read_params(&mut self) -> Result<RawParamsSet> {
        let mut params = RawParamsSet::new();
        for key in PARAM_KEYS {
            let result = self.driver()?.text(&ui::param_field(key)).await;
            let read = match result {
                Ok(text) => text,
                Err(e) if e.is_soft() => {
                    self.logger
                        .warn(&format!("Parameter {} not present", key));
                    PARAM_MISSING.to_string()
                }
                Err(e) => return Err(e),
            };
            params.insert(key, read);
        }
        Ok(params)
    }

    /// Return to the home page so the next cycle starts from a known state.
    ///
    /// A broken back control is tolerated by dropping the session (next
    /// cycle re-logins), but the home marker itself must reappear.
    async fn back_to_main(&mut self) -> Result<()> {
        let result = self.driver()?.click(&ui::params_back()).await;
        match result {
            Ok(()) => {}
            Err(e) if e.is_soft() => {
                self.logger.warn(&format!("Back control unusable: {}", e));
                self.logged_in = false;
            }
            Err(e) => return Err(e),
        }

        self.await_home()
            .await
            .map_err(|e| hard_failure("Home page not restored after reading", e))
    }
}
