use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::Config;

pub trait CheckConfig {
    fn check(&self, config: &Config) -> Option<CheckConfigResult>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfigItemResult {
    pub config: Arc<String>,
    pub item: String,
    pub message: String,
}

impl Display for CheckConfigItemResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.config, self.item, self.message)
    }
}

#[derive(Debug, Default)]
pub struct CheckConfigResult {
    pub warnings: Vec<CheckConfigItemResult>,
    pub errors: Vec<CheckConfigItemResult>,
    pub show_warnings: bool,
}

impl CheckConfigResult {
    pub fn add_warn(&mut self, item: CheckConfigItemResult) {
        self.warnings.push(item);
    }

    pub fn add_error(&mut self, item: CheckConfigItemResult) {
        self.errors.push(item);
    }

    pub fn add_all(&mut self, other: CheckConfigResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Sorts items so that the printed report is stable.
    pub fn introspect(&mut self) {
        self.warnings
            .sort_by(|a, b| (&a.config, &a.item).cmp(&(&b.config, &b.item)));
        self.errors
            .sort_by(|a, b| (&a.config, &a.item).cmp(&(&b.config, &b.item)));
    }
}

impl Display for CheckConfigResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() && (!self.show_warnings || self.warnings.is_empty()) {
            return write!(f, "Config is OK.");
        }
        if self.show_warnings {
            for w in self.warnings.iter() {
                writeln!(f, "Warning: {}", w)?;
            }
        }
        for e in self.errors.iter() {
            writeln!(f, "Error: {}", e)?;
        }
        Ok(())
    }
}
