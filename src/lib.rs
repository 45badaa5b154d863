//! # Hestia - Kospel heater panel bridge for Home Assistant
//!
//! Hestia polls the Kospel vendor's browser-only control panel for an
//! electric-heating appliance and republishes the readings and status
//! flags as Home Assistant sensors. The panel was built for humans, not
//! machines: pages load asynchronously, values populate only after
//! user-like interaction, and sessions expire silently. The core of the
//! crate is the navigation and extraction state machine that tolerates
//! all of that.
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of
//! concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `browser`: Automation driver boundary and headless Chromium client
//! - `panel`: Panel navigation and readout state machine
//! - `readout`: Pure interpretation of raw readouts into sensor values
//! - `sensors`: Published sensor registry with attribute bundles
//! - `hass`: Home Assistant state publishing
//! - `addon`: Poll scheduling, lifecycle and outage handling

pub mod addon;
pub mod browser;
pub mod config;
pub mod error;
pub mod hass;
pub mod logging;
pub mod panel;
pub mod readout;
pub mod sensors;

// Re-export commonly used types
pub use config::Config;
pub use error::{HestiaError, Result};
pub use panel::PanelSession;
