//! Shared configuration structs.

use serde::Deserialize;

/// Limits applied during input validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Maximum slug length in UTF-8 bytes.
    #[serde(default = "default_max_slug_bytes")]
    pub max_slug_bytes: usize,
    /// Maximum project name length in UTF-8 bytes.
    #[serde(default = "default_max_name_bytes")]
    pub max_name_bytes: usize,
    /// Maximum description length in UTF-8 bytes.
    #[serde(default = "default_max_description_bytes")]
    pub max_description_bytes: usize,
    /// Maximum mission statement length in UTF-8 bytes.
    #[serde(default = "default_max_mission_statement_bytes")]
    pub max_mission_statement_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_slug_bytes: default_max_slug_bytes(),
            max_name_bytes: default_max_name_bytes(),
            max_description_bytes: default_max_description_bytes(),
            max_mission_statement_bytes: default_max_mission_statement_bytes(),
        }
    }
}

fn default_max_slug_bytes() -> usize {
    63 // DNS-label sized, slugs appear in routing paths
}

fn default_max_name_bytes() -> usize {
    256
}

fn default_max_description_bytes() -> usize {
    4096
}

fn default_max_mission_statement_bytes() -> usize {
    4096
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let config = ValidationConfig::default();
        assert_eq!(config.max_slug_bytes, 63);
        assert_eq!(config.max_name_bytes, 256);
    }
}
