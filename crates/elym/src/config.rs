//! Host configuration

use elym_html::ParseOptions;
use serde::{Deserialize, Serialize};

/// Options for a [`Dom`](crate::Dom)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document URL
    pub url: String,

    /// Markup parsing options used by construction and `set_html`
    pub parse: ParseOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            parse: ParseOptions::default(),
        }
    }
}
