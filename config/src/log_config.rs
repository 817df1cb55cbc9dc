use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, CheckConfigItemResult, CheckConfigResult};
use crate::override_by_env::{entry_override, OverrideByEnv};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_level")]
    pub level: String,
    #[serde(default = "LogConfig::default_path")]
    pub path: String,
}

impl LogConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    fn default_path() -> String {
        let path = std::path::Path::new("tsfile_data").join("logs");
        path.to_string_lossy().to_string()
    }
}

impl OverrideByEnv for LogConfig {
    fn override_by_env(&mut self) {
        entry_override(&mut self.level, "TSFILE_LOG_LEVEL");
        entry_override(&mut self.path, "TSFILE_LOG_PATH");
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            path: Self::default_path(),
        }
    }
}

impl CheckConfig for LogConfig {
    fn check(&self, _: &crate::Config) -> Option<CheckConfigResult> {
        let config_name = Arc::new("log".to_string());
        let mut ret = CheckConfigResult::default();

        if self.path.is_empty() {
            ret.add_warn(CheckConfigItemResult {
                config: config_name.clone(),
                item: "path".to_string(),
                message: "'path' is empty".to_string(),
            });
        }
        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.level.to_ascii_lowercase().as_str())
        {
            ret.add_warn(CheckConfigItemResult {
                config: config_name,
                item: "level".to_string(),
                message: format!("unknown level '{}', 'warn' will be used", self.level),
            });
        }

        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }
}
