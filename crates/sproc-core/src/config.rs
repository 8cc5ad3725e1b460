//! Parameter binding configuration
//!
//! Loaded from TOML, e.g.
//!
//! ```toml
//! parameter_prefix = "@"
//! return_value_name = "RETURN_VALUE"
//! default_text_size = 4000
//! ```

use crate::{ProcError, Result};
use serde::{Deserialize, Serialize};

fn default_prefix() -> String {
    "@".to_string()
}

fn default_return_value_name() -> String {
    "RETURN_VALUE".to_string()
}

fn default_text_size() -> Option<u32> {
    Some(4000)
}

/// Settings that shape how parameters are named and declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderConfig {
    /// Prefix the server expects in front of parameter names
    #[serde(default = "default_prefix")]
    pub parameter_prefix: String,

    /// Name of the reserved return-value parameter
    #[serde(default = "default_return_value_name")]
    pub return_value_name: String,

    /// Width used for text outputs declared without a fixed size.
    /// `None` leaves the width to the server (e.g. `NVARCHAR(MAX)`).
    #[serde(default = "default_text_size")]
    pub default_text_size: Option<u32>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            parameter_prefix: default_prefix(),
            return_value_name: default_return_value_name(),
            default_text_size: default_text_size(),
        }
    }
}

impl BinderConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: BinderConfig =
            toml::from_str(source).map_err(|e| ProcError::Configuration(e.to_string()))?;
        if config.return_value_name.trim().is_empty() {
            return Err(ProcError::Configuration(
                "return_value_name must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Name as the server sees it, e.g. `@total`
    pub fn qualified_name(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix, name)
    }
}
