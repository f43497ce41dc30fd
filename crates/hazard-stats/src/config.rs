//! Configuration for the hazard statistics operator.

use projection::DEFAULT_ENVELOPE_DENSIFICATION;
use serde::{Deserialize, Serialize};

/// Configuration for the hazard statistics operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Accept CRS pairs with different datums and no shift parameters.
    pub lenient_datum_shift: bool,

    /// Points sampled per envelope edge when reprojecting request envelopes.
    pub envelope_densification: usize,

    /// Honour the progress listener's cancellation flag.
    pub check_cancellation: bool,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            lenient_datum_shift: true,
            envelope_densification: DEFAULT_ENVELOPE_DENSIFICATION,
            check_cancellation: true,
        }
    }
}

impl OperatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HAZARD_LENIENT_DATUM_SHIFT") {
            config.lenient_datum_shift = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("HAZARD_ENVELOPE_DENSIFICATION") {
            if let Ok(samples) = val.parse() {
                config.envelope_densification = samples;
            }
        }

        if let Ok(val) = std::env::var("HAZARD_CHECK_CANCELLATION") {
            config.check_cancellation = parse_bool(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.envelope_densification == 0 {
            return Err("envelope_densification must be > 0".to_string());
        }

        Ok(())
    }
}

fn parse_bool(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}
