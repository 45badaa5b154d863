//! Home Assistant state publishing
//!
//! Outbound boundary to the automation host. The host only ever receives
//! one kind of write: an entity state plus an attribute object. The
//! [`StatePublisher`] trait keeps that boundary to a single operation;
//! [`HassClient`] implements it against the Home Assistant REST API.

use crate::config::HassConfig;
use crate::error::{HestiaError, Result};
use crate::logging::get_logger;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// One state write per published sensor
#[async_trait]
pub trait StatePublisher: Send + Sync {
    /// Write one entity state with its attribute bundle
    async fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> Result<()>;
}

/// Home Assistant REST API client
pub struct HassClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
    logger: crate::logging::StructuredLogger,
}

impl HassClient {
    /// Create a client for the configured Home Assistant instance
    pub fn new(config: &HassConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HestiaError::api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http,
            logger: get_logger("hass"),
        })
    }

    fn state_url(&self, entity_id: &str) -> String {
        format!("{}/api/states/{}", self.base_url, entity_id)
    }
}

#[async_trait]
impl StatePublisher for HassClient {
    async fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> Result<()> {
        let url = self.state_url(entity_id);
        let body = serde_json::json!({
            "state": state,
            "attributes": attributes,
        });

        self.logger
            .debug(&format!("Updating {}: {}", entity_id, state));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HestiaError::api(format!(
                "State write for {} failed with HTTP {}",
                entity_id,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HassConfig;

    #[test]
    fn state_url_building() {
        let mut config = HassConfig::default();
        config.base_url = "http://hass.local:8123/".to_string();
        let client = HassClient::new(&config).unwrap();
        assert_eq!(
            client.state_url("sensor.kospel_temp_room"),
            "http://hass.local:8123/api/states/sensor.kospel_temp_room"
        );
    }

    #[test]
    fn client_creation() {
        let config = HassConfig::default();
        assert!(HassClient::new(&config).is_ok());
    }
}
