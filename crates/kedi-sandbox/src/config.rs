use serde::{Deserialize, Serialize};

/// Fuel granted to a single execution when none is configured.
pub const DEFAULT_FUEL: u64 = 10_000_000;

/// Sandbox settings, usually read from the `[sandbox]` table of a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    /// Instruction budget per execution; exceeding it is `FuelExhausted`.
    pub fuel: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self { fuel: DEFAULT_FUEL }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SandboxConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SandboxConfig::default());
        assert_eq!(config.fuel, DEFAULT_FUEL);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<SandboxConfig>(r#"{"fuel": 5, "memory": 1}"#).is_err());
        let config: SandboxConfig = serde_json::from_str(r#"{"fuel": 5}"#).unwrap();
        assert_eq!(config.fuel, 5);
    }
}
