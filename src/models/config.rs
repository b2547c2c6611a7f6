use serde::{Deserialize, Serialize};

/// User configuration from `Realmstash Config.yaml`
///
/// Contains refresh scheduling, data locations and the fetch helper command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Realmstash_Settings")]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Milliseconds between automatic queue ticks.
    #[serde(rename = "Queue Fetch Interval", default = "default_queue_fetch_interval")]
    pub queue_fetch_interval_ms: u64,

    /// Command line of the external helper that returns one snapshot
    /// document on stdout. Guid and password are appended as arguments.
    #[serde(rename = "Fetch Command", default)]
    pub fetch_command: String,

    /// Where the account store JSON lives.
    #[serde(rename = "Data File", default = "default_data_file")]
    pub data_file: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue_fetch_interval_ms: default_queue_fetch_interval(),
            fetch_command: String::new(),
            data_file: default_data_file(),
            debug_mode: false,
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
        }
    }
}

fn default_queue_fetch_interval() -> u64 {
    70_000
}

fn default_data_file() -> String {
    "Realmstash Data/accounts.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.queue_fetch_interval_ms, 70_000);
        assert_eq!(settings.data_file, "Realmstash Data/accounts.json");
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let yaml = "Realmstash_Settings:\n  Debug Mode: true\n";
        let config: UserConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(config.settings.debug_mode);
        assert_eq!(config.settings.queue_fetch_interval_ms, 70_000);
    }
}
