//! Remote news API settings.

use std::time::Duration;

use serde::Deserialize;

use crate::viewmodel::ViewModelSettings;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Country code used for headlines and for retrying them
    pub country: String,
    pub page_size: u32,
    pub search_delay_ms: u64,
    pub timeout_secs: u64,
    pub skip_connectivity_check: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            api_key: None,
            country: "in".to_string(),
            page_size: 20,
            search_delay_ms: 500,
            timeout_secs: 10,
            skip_connectivity_check: false,
        }
    }
}

impl ApiConfig {
    pub fn viewmodel_settings(&self) -> ViewModelSettings {
        ViewModelSettings {
            page_size: self.page_size.max(1),
            search_delay: Duration::from_millis(self.search_delay_ms),
        }
    }
}
