use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the playground runs artifacts, usually read from the `[playground]`
/// table of a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
    /// Exported function invoked after each successful compile.
    pub entry_point: String,
    pub args: Vec<i32>,
    /// Executions still running after this long resolve to a failure.
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Option<Duration>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            entry_point: "main".to_string(),
            args: Vec::new(),
            timeout: None,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: PlaygroundConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PlaygroundConfig::default());
        assert_eq!(config.entry_point, "main");
        assert!(config.args.is_empty());
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_timeout_in_milliseconds() {
        let config: PlaygroundConfig =
            serde_json::from_str(r#"{"entry_point": "fib", "args": [10], "timeout_ms": 250}"#)
                .unwrap();
        assert_eq!(config.entry_point, "fib");
        assert_eq!(config.args, [10]);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 250);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<PlaygroundConfig>(r#"{"timeout": 5}"#).is_err());
    }
}
