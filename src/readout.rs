//! Interpretation of raw panel readouts
//!
//! Pure transformation from the strings and color codes scraped off the
//! vendor panel into typed sensor values. No I/O happens here; unreadable
//! input degrades to a missing marker instead of failing the poll cycle,
//! which keeps a single broken field from taking down the whole readout.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Canonical fill colors used by the panel's status icons
pub mod colors {
    /// Service armed, currently idle
    pub const GREEN: &str = "rgb(0, 170, 0)";
    /// Service actively heating
    pub const RED: &str = "rgb(255, 0, 0)";
    /// Service switched off
    pub const WHITE: &str = "rgb(233, 233, 233)";
    /// Service switched on
    pub const GRAY: &str = "rgb(133, 133, 133)";
    /// Sentinel recorded when an icon could not be read
    pub const BLACK: &str = "rgb(0, 0, 0)";
}

/// Categorical state of one status icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Standby,
    Active,
    On,
    Off,
    Unknown,
}

impl StatusCategory {
    /// State string published to the host
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Standby => "standby",
            StatusCategory::Active => "active",
            StatusCategory::On => "on",
            StatusCategory::Off => "off",
            StatusCategory::Unknown => "unknown",
        }
    }
}

/// A resolved value for one published sensor
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    /// Numeric measurement with the unit observed on the panel
    Numeric { value: f64, unit: Option<String> },
    /// Categorical state string
    State(&'static str),
    /// The value could not be determined this cycle
    Unavailable,
}

impl SensorValue {
    /// State string as written to the host's state store
    pub fn state_string(&self) -> String {
        match self {
            SensorValue::Numeric { value, .. } => format!("{}", value),
            SensorValue::State(s) => (*s).to_string(),
            SensorValue::Unavailable => "Unavailable".to_string(),
        }
    }
}

/// The panel renders numbers with `.` decimal points and `-` signs; a value
/// token is accepted when nothing but numeric characters remains after those
/// are stripped. Deliberately loose (it admits tokens like `--.5`), matching
/// what the panel has been observed to emit.
fn is_numeric_token(token: &str) -> bool {
    let stripped: String = token.chars().filter(|c| *c != '.' && *c != '-').collect();
    !stripped.is_empty() && stripped.chars().all(char::is_numeric)
}

/// Parse a parameter readout of the form `"<number> <unit>"`.
///
/// Returns the numeric value and the unit as displayed, or `None` when the
/// text does not carry a readable number. Never fails.
pub fn parse_param(text: &str) -> Option<(f64, String)> {
    let (value, unit) = text.split_once(' ')?;
    if unit.contains(' ') {
        warn!("Unexpected parameter layout: {:?}", text);
        return None;
    }
    if !is_numeric_token(value) {
        warn!("Non-numeric value token: {:?}", value);
        return None;
    }
    match value.parse::<f64>() {
        Ok(parsed) => Some((parsed, unit.to_string())),
        Err(_) => {
            warn!("Unconvertible value token: {:?}", value);
            None
        }
    }
}

/// Parse a setting readout of the form `"<number>°"`.
///
/// The degree glyph is stripped before the numeric check. Returns `None`
/// when no readable number remains. Never fails.
pub fn parse_setting(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '°').collect();
    if !is_numeric_token(&cleaned) {
        warn!("Non-numeric setting text: {:?}", text);
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Unconvertible setting text: {:?}", text);
            None
        }
    }
}

/// Classify a status icon's fill color into its categorical state.
///
/// Exact string match against the five canonical encodings; anything else
/// resolves to `Unknown`.
pub fn classify_status(color: &str) -> StatusCategory {
    match color {
        colors::GREEN => StatusCategory::Standby,
        colors::RED => StatusCategory::Active,
        colors::GRAY => StatusCategory::On,
        colors::WHITE => StatusCategory::Off,
        colors::BLACK => StatusCategory::Unknown,
        other => {
            warn!("Unknown status color: {:?}", other);
            StatusCategory::Unknown
        }
    }
}

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^rgb\((\d{1,3}), (\d{1,3}), (\d{1,3})\)$").unwrap()
});

/// Extract the `(r, g, b)` components from a canonical `rgb(r, g, b)`
/// string. Any deviation from that form yields `None`.
pub fn extract_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let caps = RGB_RE.captures(color)?;
    let r = caps.get(1)?.as_str().parse::<u8>().ok()?;
    let g = caps.get(2)?.as_str().parse::<u8>().ok()?;
    let b = caps.get(3)?.as_str().parse::<u8>().ok()?;
    Some((r, g, b))
}
