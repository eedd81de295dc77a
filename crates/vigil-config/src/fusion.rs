//! Risk fusion thresholds.

use serde::{Deserialize, Serialize};

const fn default_high_variance_threshold() -> f64 {
    0.25
}

const fn default_discordance_threshold() -> f64 {
    0.5
}

const fn default_discordance_min_confidence() -> f64 {
    0.5
}

fn default_expected_domains() -> Vec<String> {
    ["network", "device", "location", "logs", "authentication"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FusionConfig {
    /// Confidence spread (standard deviation) above which sources are
    /// flagged as disagreeing.
    #[serde(default = "default_high_variance_threshold")]
    pub high_variance_threshold: f64,

    /// Risk score gap between two sources that is reported as discordance.
    #[serde(default = "default_discordance_threshold")]
    pub discordance_threshold: f64,

    /// Sources below this confidence never count toward discordance.
    #[serde(default = "default_discordance_min_confidence")]
    pub discordance_min_confidence: f64,

    /// Domains a complete investigation is expected to report.
    #[serde(default = "default_expected_domains")]
    pub expected_domains: Vec<String>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            high_variance_threshold: default_high_variance_threshold(),
            discordance_threshold: default_discordance_threshold(),
            discordance_min_confidence: default_discordance_min_confidence(),
            expected_domains: default_expected_domains(),
        }
    }
}
