use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use check::{CheckConfig, CheckConfigResult};
use serde::{Deserialize, Serialize};

pub use crate::log_config::*;
use crate::override_by_env::OverrideByEnv;
pub use crate::tsfile_config::*;

pub mod check;
mod codec;
mod log_config;
pub mod override_by_env;
mod tsfile_config;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "Default::default")]
    pub tsfile: TsFileConfig,

    #[serde(default = "Default::default")]
    pub log: LogConfig,
}

impl Config {
    pub fn override_by_env(&mut self) {
        self.tsfile.override_by_env();
        self.log.override_by_env();
    }

    pub fn to_string_pretty(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| "Failed to stringify Config".to_string())
    }

    pub fn check(&self) -> CheckConfigResult {
        let mut check_results = CheckConfigResult::default();
        if let Some(c) = self.tsfile.check(self) {
            check_results.add_all(c)
        }
        if let Some(c) = self.log.check(self) {
            check_results.add_all(c)
        }
        check_results.introspect();
        check_results
    }
}

pub fn get_config(path: impl AsRef<Path>) -> Result<Config, std::io::Error> {
    let path = path.as_ref();
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            return Err(io::Error::new(
                err.kind(),
                format!(
                    "Failed to open configuration file '{}': {:?}",
                    path.display(),
                    err
                )
                .as_str(),
            ));
        }
    };
    let mut content = String::new();
    if let Err(err) = file.read_to_string(&mut content) {
        return Err(io::Error::new(
            err.kind(),
            format!(
                "Failed to read configuration file '{}': {:?}",
                path.display(),
                err
            )
            .as_str(),
        ));
    }
    let config: Config = match toml::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "Failed to parse configuration file '{}': {:?}",
                    path.display(),
                    err
                )
                .as_str(),
            ));
        }
    };
    Ok(config)
}

pub fn check_config(path: impl AsRef<Path>, show_warnings: bool) {
    match get_config(path) {
        Ok(cfg) => {
            let mut check_results = cfg.check();
            check_results.show_warnings = show_warnings;
            println!("{}", check_results);
        }
        Err(err) => {
            println!("{}", err);
        }
    };
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use serial_test::serial;

    use crate::Config;

    #[test]
    fn test_write_read() {
        let cfg = Config::default();
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        let mut cfg_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&cfg_path)
            .unwrap();
        let _ = cfg_file.write(cfg.to_string_pretty().as_bytes()).unwrap();
        let cfg_2 = crate::get_config(&cfg_path).unwrap();

        assert_eq!(cfg, cfg_2);
    }

    #[test]
    fn test_parse() {
        let config_str = r#"
[tsfile]
# Soft size target of a page.
page_size_threshold = "64KiB"
max_points_per_page = 10000
time_encoding = "PLAIN"
compressor = "SNAPPY"
strict_time_order = true

[log]
level = 'debug'
path = 'data/log'
"#;

        let config: Config = toml::from_str(config_str).unwrap();
        assert_eq!(config.tsfile.page_size_threshold, 64 * 1024);
        assert_eq!(config.tsfile.max_points_per_page, 10000);
        assert_eq!(config.tsfile.time_encoding, "PLAIN");
        assert_eq!(config.tsfile.compressor, "SNAPPY");
        assert!(config.tsfile.strict_time_order);
        assert_eq!(config.log.level, "debug");
        assert!(config.check().is_empty());
    }

    #[test]
    fn test_parse_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(toml::to_string_pretty(&config).is_ok());
    }

    #[test]
    fn test_check() {
        let mut config = Config::default();
        config.tsfile.page_size_threshold = 0;
        config.tsfile.time_encoding = "GORILLA".to_string();
        let result = config.check();
        assert!(result.has_error());
        assert_eq!(result.errors.len(), 2);

        let mut config = Config::default();
        config.tsfile.page_size_threshold = 100;
        let result = config.check();
        assert!(!result.has_error());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    #[serial]
    fn test_override_by_env() {
        std::env::set_var("TSFILE_PAGE_SIZE_THRESHOLD", "2MiB");
        std::env::set_var("TSFILE_MAX_POINTS_PER_PAGE", "128");
        std::env::set_var("TSFILE_STRICT_TIME_ORDER", "not-a-bool");
        let mut config = Config::default();
        config.override_by_env();
        std::env::remove_var("TSFILE_PAGE_SIZE_THRESHOLD");
        std::env::remove_var("TSFILE_MAX_POINTS_PER_PAGE");
        std::env::remove_var("TSFILE_STRICT_TIME_ORDER");

        assert_eq!(config.tsfile.page_size_threshold, 2 * 1024 * 1024);
        assert_eq!(config.tsfile.max_points_per_page, 128);
        assert!(!config.tsfile.strict_time_order);
    }
}
