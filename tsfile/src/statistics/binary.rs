use serde::{Deserialize, Serialize};

/// Binary values are ordered lexicographically by bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryStatistics {
    pub count: u64,
    pub min_value: Option<Vec<u8>>,
    pub max_value: Option<Vec<u8>>,
    pub first_value: Option<Vec<u8>>,
    pub last_value: Option<Vec<u8>>,
}

impl BinaryStatistics {
    pub fn update(&mut self, v: &[u8]) {
        if self.min_value.as_deref().map_or(true, |min| v < min) {
            self.min_value = Some(v.to_vec());
        }
        if self.max_value.as_deref().map_or(true, |max| v > max) {
            self.max_value = Some(v.to_vec());
        }
        if self.first_value.is_none() {
            self.first_value = Some(v.to_vec());
        }
        self.last_value = Some(v.to_vec());
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }
        if let Some(min) = other.min_value.as_deref() {
            if self.min_value.as_deref().map_or(true, |m| min < m) {
                self.min_value = Some(min.to_vec());
            }
        }
        if let Some(max) = other.max_value.as_deref() {
            if self.max_value.as_deref().map_or(true, |m| max > m) {
                self.max_value = Some(max.to_vec());
            }
        }
        self.last_value = other.last_value.clone();
        self.count += other.count;
    }
}
