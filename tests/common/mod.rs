//! Shared test doubles: a scripted in-memory rendition of the vendor panel
//! and a recording state publisher.

#![allow(dead_code)]

use async_trait::async_trait;
use hestia::browser::{DriverFactory, Locator, PanelDriver};
use hestia::config::{Config, PanelConfig, TimeoutsConfig};
use hestia::error::{HestiaError, Result};
use hestia::hass::StatePublisher;
use hestia::panel::PanelSession;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Pages of the scripted panel, mirroring the vendor UI flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Devices,
    Module,
    Home,
    Params,
}

/// Mutable model of the scripted panel, shared with the test body
#[derive(Debug)]
pub struct PanelState {
    pub page: Page,
    /// Login form never renders (unreachable/blank login page)
    pub login_broken: bool,
    /// Module selection silently does nothing
    pub module_broken: bool,
    /// Back control absent on the parameters view
    pub back_broken: bool,
    /// Home marker stays in the DOM while the parameters view is open
    pub params_keep_home_marker: bool,
    pub device_count: usize,
    /// Element id -> computed fill color (status icons)
    pub status_fills: HashMap<String, String>,
    /// Element id -> text content (settings and parameters)
    pub texts: HashMap<String, String>,
    /// Completed module selections (one per full login sequence)
    pub login_count: u32,
    pub closed: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            page: Page::Login,
            login_broken: false,
            module_broken: false,
            back_broken: false,
            params_keep_home_marker: false,
            device_count: 1,
            status_fills: HashMap::new(),
            texts: HashMap::new(),
            login_count: 0,
            closed: false,
        }
    }
}

impl PanelState {
    fn id_present(&self, id: &str) -> bool {
        match self.page {
            Page::Login => !self.login_broken && (id == "login" || id == "pass"),
            Page::Devices => false,
            Page::Module => id == "start",
            Page::Home => {
                id == "path7"
                    || id == "parameters_lbl_"
                    || self.status_fills.contains_key(id)
                    || (!id.starts_with("params_") && self.texts.contains_key(id))
            }
            Page::Params => {
                (id == "path7" && self.params_keep_home_marker)
                    || (id.starts_with("params_") && self.texts.contains_key(id))
            }
        }
    }

    fn present(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Id(id) => self.id_present(id),
            Locator::Css(sel) => self.page == Page::Devices && sel == ".ui-body",
            Locator::Tag(tag) => self.page == Page::Devices && tag == "li" && self.device_count > 0,
            Locator::LinkText(text) => self.page == Page::Login && text == "zaloguj",
            Locator::XPath(_) => self.page == Page::Params && !self.back_broken,
        }
    }
}

/// A panel with every readable element populated
pub fn healthy_state() -> PanelState {
    let mut state = PanelState::default();

    for (icon, color) in [
        ("radiator_", "rgb(255, 0, 0)"),
        ("tap_", "rgb(0, 170, 0)"),
        ("clock_", "rgb(233, 233, 233)"),
        ("pump_", "rgb(133, 133, 133)"),
        ("error_", "rgb(233, 233, 233)"),
        ("suitcase_", "rgb(233, 233, 233)"),
    ] {
        state.status_fills.insert(icon.to_string(), color.to_string());
    }

    for (id, text) in [
        ("temp_prog", "21.5°"),
        ("temp_zas_nas", "48°"),
        ("params_temp_in", "55.4 °C"),
        ("params_temp_out", "60.1 °C"),
        ("params_temp_factor", "58.0 °C"),
        ("params_temp_room", "21.5 °C"),
        ("params_temp_outside", "-2.0 °C"),
        ("params_temp_boil", "47.3 °C"),
        ("params_power", "4 kW"),
        ("params_preasure", "1.5 bar"),
        ("params_flow", "12.4 l/min"),
    ] {
        state.texts.insert(id.to_string(), text.to_string());
    }

    state
}

/// Scripted [`PanelDriver`] over the shared panel state
pub struct ScriptedPanel {
    state: Arc<Mutex<PanelState>>,
}

#[async_trait]
impl PanelDriver for ScriptedPanel {
    async fn goto(&mut self, _url: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.page = Page::Login;
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, _timeout: Duration) -> Result<()> {
        if self.state.lock().unwrap().present(locator) {
            Ok(())
        } else {
            Err(HestiaError::timeout(format!("Timeout waiting for {}", locator)))
        }
    }

    async fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.wait_for(locator, timeout).await
    }

    async fn text(&mut self, locator: &Locator) -> Result<String> {
        let s = self.state.lock().unwrap();
        if let Locator::Id(id) = locator
            && s.present(locator)
            && let Some(text) = s.texts.get(id)
        {
            return Ok(text.clone());
        }
        Err(HestiaError::not_found(locator.to_string()))
    }

    async fn css_value(&mut self, locator: &Locator, property: &str) -> Result<String> {
        let s = self.state.lock().unwrap();
        if property == "fill"
            && let Locator::Id(id) = locator
            && s.present(locator)
            && let Some(color) = s.status_fills.get(id)
        {
            return Ok(color.clone());
        }
        Err(HestiaError::not_found(locator.to_string()))
    }

    async fn fill(&mut self, locator: &Locator, _text: &str) -> Result<()> {
        if self.state.lock().unwrap().present(locator) {
            Ok(())
        } else {
            Err(HestiaError::not_found(locator.to_string()))
        }
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if !s.present(locator) {
            return Err(HestiaError::not_found(locator.to_string()));
        }
        match locator {
            Locator::LinkText(_) => s.page = Page::Devices,
            Locator::Tag(_) => s.page = Page::Module,
            Locator::Id(id) if id == "parameters_lbl_" => s.page = Page::Params,
            Locator::XPath(_) => s.page = Page::Home,
            _ => {}
        }
        Ok(())
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize> {
        let s = self.state.lock().unwrap();
        match locator {
            Locator::Tag(tag) if s.page == Page::Devices && tag == "li" => Ok(s.device_count),
            _ => Ok(usize::from(s.present(locator))),
        }
    }

    async fn eval(&mut self, script: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if script.contains("loadModule") && s.page == Page::Module && !s.module_broken {
            s.page = Page::Home;
            s.login_count += 1;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Factory handing out drivers over the shared state; counts launches
pub struct ScriptedFactory {
    state: Arc<Mutex<PanelState>>,
    launches: Arc<Mutex<u32>>,
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    async fn launch(&self) -> Result<Box<dyn PanelDriver>> {
        *self.launches.lock().unwrap() += 1;
        {
            // A fresh browser carries no session: it starts on the login page
            let mut s = self.state.lock().unwrap();
            if s.closed {
                s.page = Page::Login;
                s.closed = false;
            }
        }
        Ok(Box::new(ScriptedPanel {
            state: self.state.clone(),
        }))
    }
}

/// Build a session over a scripted panel; returns handles for inspection
pub fn session_with(
    state: PanelState,
) -> (PanelSession, Arc<Mutex<PanelState>>, Arc<Mutex<u32>>) {
    let state = Arc::new(Mutex::new(state));
    let launches = Arc::new(Mutex::new(0));
    let factory = ScriptedFactory {
        state: state.clone(),
        launches: launches.clone(),
    };

    let panel_config = PanelConfig {
        url: "https://panel.example.com".to_string(),
        username: "user".to_string(),
        password: "secret".to_string(),
        exec_path: "/usr/bin/chromium".to_string(),
    };

    let session = PanelSession::new(&panel_config, &TimeoutsConfig::default(), Box::new(factory));
    (session, state, launches)
}

/// Config with populated panel inputs for addon construction
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.panel.url = "https://panel.example.com".to_string();
    config.panel.username = "user".to_string();
    config.panel.password = "secret".to_string();
    config
}

/// [`StatePublisher`] capturing every write for assertions
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub writes: Arc<Mutex<Vec<(String, String, Value)>>>,
}

#[async_trait]
impl StatePublisher for RecordingPublisher {
    async fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> Result<()> {
        self.writes.lock().unwrap().push((
            entity_id.to_string(),
            state.to_string(),
            attributes,
        ));
        Ok(())
    }
}

impl RecordingPublisher {
    /// Latest write for an entity, if any
    pub fn last(&self, entity_id: &str) -> Option<(String, Value)> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _, _)| id == entity_id)
            .map(|(_, state, attrs)| (state.clone(), attrs.clone()))
    }

    /// All writes for an entity, oldest first
    pub fn all(&self, entity_id: &str) -> Vec<(String, Value)> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| id == entity_id)
            .map(|(_, state, attrs)| (state.clone(), attrs.clone()))
            .collect()
    }
}
