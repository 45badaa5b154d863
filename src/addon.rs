//! Addon orchestration
//!
//! The host-facing adapter: a minutely tick at a fixed second offset, one
//! poll cycle per tick (collect, interpret, publish), an addon health
//! entity, and the outage behavior (driver stopped, every sensor reset to
//! `Unavailable` so consumers never see stale data).

use crate::config::Config;
use crate::error::Result;
use crate::hass::StatePublisher;
use crate::logging::get_logger;
use crate::panel::{PanelSession, RawParamsSet, RawSettingsSet, RawStatusSet};
use crate::readout::{self, SensorValue};
use crate::sensors::{self, SensorMeta};
use chrono::{Local, Timelike};
use serde_json::{Map, Value};
use std::time::Duration;

/// Health state of the addon; the single authoritative "is this working"
/// signal for downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonState {
    On,
    Off,
}

impl AddonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonState::On => "on",
            AddonState::Off => "off",
        }
    }
}

/// Seconds until the next occurrence of the configured second offset.
/// Always at least one second so a tick never fires twice in the same
/// minute slot.
fn seconds_until_offset(now_second: u32, offset_second: u8) -> u64 {
    let now = u64::from(now_second);
    let offset = u64::from(offset_second);
    if now < offset {
        offset - now
    } else {
        60 - (now - offset)
    }
}

fn sensor_entity_id(prefix: &str, key: &str) -> String {
    format!("sensor.{}_{}", prefix, key)
}

/// The bridge between the poll schedule, the panel session and the host
pub struct Addon {
    panel: PanelSession,
    publisher: Box<dyn StatePublisher>,
    entity_prefix: String,
    offset_second: u8,
    state: AddonState,
    logger: crate::logging::StructuredLogger,
}

impl Addon {
    pub fn new(config: &Config, panel: PanelSession, publisher: Box<dyn StatePublisher>) -> Self {
        Self {
            panel,
            publisher,
            entity_prefix: config.hass.entity_prefix.clone(),
            offset_second: config.schedule.offset_second,
            state: AddonState::Off,
            logger: get_logger("addon"),
        }
    }

    /// Current health state
    pub fn state(&self) -> AddonState {
        self.state
    }

    /// Run until a shutdown signal arrives: one read cycle per minute at
    /// the configured second offset, then a clean terminate.
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info("Addon started");

        loop {
            let delay = Duration::from_secs(seconds_until_offset(
                Local::now().second(),
                self.offset_second,
            ));

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    self.read_data().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.terminate().await;
        Ok(())
    }

    /// One poll cycle. Never propagates an error: a failed cycle marks the
    /// addon off and leaves recovery to the next tick.
    pub async fn read_data(&mut self) {
        self.logger.info("Reading data");
        if !self.panel.is_authenticated() {
            self.logger.info("Authenticating at web service");
        }

        let result = self.panel.collect().await;
        match result {
            Ok((statuses, params, settings)) => {
                self.logger.info("Processing results");
                self.process_params(&params).await;
                self.process_statuses(&statuses).await;
                self.process_settings(&settings).await;
                self.set_addon_state(AddonState::On).await;
            }
            Err(e) => {
                self.logger.error(&format!("Collection cycle failed: {}", e));
                self.set_addon_state(AddonState::Off).await;
            }
        }
    }

    /// Host shutdown/reload hook: stop the driver, then mark the addon off
    pub async fn terminate(&mut self) {
        self.panel.stop().await;
        self.set_addon_state(AddonState::Off).await;
    }

    /// Update the addon health entity. Going off also stops the driver
    /// (forcing a full re-login next cycle) and blanks every sensor.
    pub async fn set_addon_state(&mut self, state: AddonState) {
        if state == AddonState::Off {
            self.panel.stop().await;
            self.reset().await;
        }

        let entity_id = format!("{}.state", self.entity_prefix);
        if let Err(e) = self
            .publisher
            .set_state(&entity_id, state.as_str(), Value::Object(Map::new()))
            .await
        {
            self.logger
                .warn(&format!("State write for {} failed: {}", entity_id, e));
        }
        self.state = state;
    }

    /// Set every published sensor to the explicit `Unavailable` value
    async fn reset(&self) {
        for meta in sensors::all() {
            self.sensor_state(meta, &SensorValue::Unavailable, None).await;
        }
    }

    /// Write one sensor state, merging the fixed attribute bundle with any
    /// per-cycle extras (observed unit, icon color)
    async fn sensor_state(
        &self,
        meta: &SensorMeta,
        value: &SensorValue,
        extra: Option<Map<String, Value>>,
    ) {
        let entity_id = sensor_entity_id(&self.entity_prefix, meta.key);
        let mut attributes = meta.attributes();
        if let SensorValue::Numeric {
            unit: Some(unit), ..
        } = value
        {
            attributes.insert(
                "unit_of_measurement".to_string(),
                Value::String(unit.clone()),
            );
        }
        if let Some(extra) = extra {
            attributes.extend(extra);
        }

        let state = value.state_string();
        self.logger
            .debug(&format!("Updating sensor {}: {}", entity_id, state));
        if let Err(e) = self
            .publisher
            .set_state(&entity_id, &state, Value::Object(attributes))
            .await
        {
            self.logger
                .warn(&format!("State write for {} failed: {}", entity_id, e));
        }
    }

    /// Publish the measurement sensors from the raw parameter readouts
    async fn process_params(&self, params: &RawParamsSet) {
        for meta in &sensors::MEASUREMENTS {
            let Some(text) = params.get(meta.param_key().as_str()) else {
                self.logger.warn(&format!("Parameter {} not found!", meta.key));
                continue;
            };

            match readout::parse_param(text) {
                Some((value, unit)) => {
                    self.sensor_state(
                        meta,
                        &SensorValue::Numeric {
                            value,
                            unit: Some(unit),
                        },
                        None,
                    )
                    .await;
                }
                None => {
                    self.logger
                        .warn(&format!("Non-numeric value ({}) for {}!", text, meta.key));
                }
            }
        }
    }

    /// Publish the status sensors from the raw icon colors
    async fn process_statuses(&self, statuses: &RawStatusSet) {
        for meta in &sensors::STATUSES {
            let Some(color) = statuses.get(meta.key) else {
                self.logger.warn(&format!("Status {} not found!", meta.key));
                continue;
            };

            let category = readout::classify_status(color);
            let mut extra = Map::new();
            if let Some((r, g, b)) = readout::extract_rgb(color) {
                extra.insert("rgb_color".to_string(), serde_json::json!([r, g, b]));
            }

            self.sensor_state(meta, &SensorValue::State(category.as_str()), Some(extra))
                .await;
        }
    }

    /// Publish the setting sensors from the raw setting texts
    async fn process_settings(&self, settings: &RawSettingsSet) {
        for meta in &sensors::SETTINGS {
            let Some(text) = settings.get(meta.key) else {
                self.logger.warn(&format!("Setting {} not found!", meta.key));
                continue;
            };

            match readout::parse_setting(text) {
                Some(value) => {
                    self.sensor_state(meta, &SensorValue::Numeric { value, unit: None }, None)
                        .await;
                }
                None => {
                    self.logger
                        .warn(&format!("Non-numeric value ({}) for {}!", text, meta.key));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_delay_computation() {
        // Before the offset within the current minute
        assert_eq!(seconds_until_offset(10, 31), 21);
        assert_eq!(seconds_until_offset(0, 31), 31);
        // At or past the offset rolls into the next minute
        assert_eq!(seconds_until_offset(31, 31), 60);
        assert_eq!(seconds_until_offset(45, 31), 46);
        assert_eq!(seconds_until_offset(59, 0), 1);
    }

    #[test]
    fn addon_state_strings() {
        assert_eq!(AddonState::On.as_str(), "on");
        assert_eq!(AddonState::Off.as_str(), "off");
    }

    #[test]
    fn entity_id_format() {
        assert_eq!(
            sensor_entity_id("kospel", "temp_room"),
            "sensor.kospel_temp_room"
        );
    }
}
