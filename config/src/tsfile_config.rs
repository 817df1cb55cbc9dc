use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, CheckConfigItemResult, CheckConfigResult};
use crate::codec::bytes_num;
use crate::override_by_env::{entry_override, entry_override_bytes_num, OverrideByEnv};

/// Write-path settings shared by every series writer of a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TsFileConfig {
    /// Soft size target of one page; crossing it triggers an early page flush.
    #[serde(
        with = "bytes_num",
        default = "TsFileConfig::default_page_size_threshold"
    )]
    pub page_size_threshold: u64,

    /// Hard upper bound of points buffered in one page.
    #[serde(default = "TsFileConfig::default_max_points_per_page")]
    pub max_points_per_page: usize,

    #[serde(default = "TsFileConfig::default_time_encoding")]
    pub time_encoding: String,

    #[serde(default = "TsFileConfig::default_compressor")]
    pub compressor: String,

    /// If true, a point whose timestamp is not greater than the previous one is rejected.
    #[serde(default = "TsFileConfig::default_strict_time_order")]
    pub strict_time_order: bool,
}

impl TsFileConfig {
    pub fn default_page_size_threshold() -> u64 {
        1024 * 1024
    }

    pub fn default_max_points_per_page() -> usize {
        1024 * 1024
    }

    fn default_time_encoding() -> String {
        "DELTA".to_string()
    }

    fn default_compressor() -> String {
        "UNCOMPRESSED".to_string()
    }

    fn default_strict_time_order() -> bool {
        false
    }
}

impl Default for TsFileConfig {
    fn default() -> Self {
        Self {
            page_size_threshold: Self::default_page_size_threshold(),
            max_points_per_page: Self::default_max_points_per_page(),
            time_encoding: Self::default_time_encoding(),
            compressor: Self::default_compressor(),
            strict_time_order: Self::default_strict_time_order(),
        }
    }
}

impl OverrideByEnv for TsFileConfig {
    fn override_by_env(&mut self) {
        entry_override_bytes_num(&mut self.page_size_threshold, "TSFILE_PAGE_SIZE_THRESHOLD");
        entry_override(&mut self.max_points_per_page, "TSFILE_MAX_POINTS_PER_PAGE");
        entry_override(&mut self.time_encoding, "TSFILE_TIME_ENCODING");
        entry_override(&mut self.compressor, "TSFILE_COMPRESSOR");
        entry_override(&mut self.strict_time_order, "TSFILE_STRICT_TIME_ORDER");
    }
}

impl CheckConfig for TsFileConfig {
    fn check(&self, _: &crate::Config) -> Option<CheckConfigResult> {
        let config_name = Arc::new("tsfile".to_string());
        let mut ret = CheckConfigResult::default();

        if self.page_size_threshold == 0 {
            ret.add_error(CheckConfigItemResult {
                config: config_name.clone(),
                item: "page_size_threshold".to_string(),
                message: "'page_size_threshold' must be greater than 0".to_string(),
            });
        } else if self.page_size_threshold < 1024 {
            ret.add_warn(CheckConfigItemResult {
                config: config_name.clone(),
                item: "page_size_threshold".to_string(),
                message: "'page_size_threshold' maybe too small(less than 1K)".to_string(),
            });
        }
        if self.max_points_per_page == 0 {
            ret.add_error(CheckConfigItemResult {
                config: config_name.clone(),
                item: "max_points_per_page".to_string(),
                message: "'max_points_per_page' must be greater than 0".to_string(),
            });
        }
        if !["PLAIN", "DELTA"].contains(&self.time_encoding.to_ascii_uppercase().as_str()) {
            ret.add_error(CheckConfigItemResult {
                config: config_name.clone(),
                item: "time_encoding".to_string(),
                message: format!(
                    "'time_encoding' must be one of PLAIN, DELTA, got '{}'",
                    self.time_encoding
                ),
            });
        }
        if !["UNCOMPRESSED", "SNAPPY"].contains(&self.compressor.to_ascii_uppercase().as_str()) {
            ret.add_error(CheckConfigItemResult {
                config: config_name,
                item: "compressor".to_string(),
                message: format!(
                    "'compressor' must be one of UNCOMPRESSED, SNAPPY, got '{}'",
                    self.compressor
                ),
            });
        }

        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }
}
