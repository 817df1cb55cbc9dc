use std::fmt::Debug;

use models::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Value types aggregated by [`PrimitiveStatistics`].
pub trait NativeType: Copy + Debug + PartialEq + PartialOrd + Serialize + DeserializeOwned {
    fn to_f64(self) -> f64;
}

impl NativeType for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl NativeType for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl NativeType for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl NativeType for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

impl NativeType for Decimal {
    fn to_f64(self) -> f64 {
        Decimal::to_f64(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: NativeType")]
pub struct PrimitiveStatistics<T: NativeType> {
    pub count: u64,
    pub min_value: Option<T>,
    pub max_value: Option<T>,
    pub first_value: Option<T>,
    pub last_value: Option<T>,
    pub sum: f64,
}

impl<T: NativeType> Default for PrimitiveStatistics<T> {
    fn default() -> Self {
        Self {
            count: 0,
            min_value: None,
            max_value: None,
            first_value: None,
            last_value: None,
            sum: 0.0,
        }
    }
}

impl<T: NativeType> PrimitiveStatistics<T> {
    pub fn update(&mut self, v: T) {
        if self.min_value.map_or(true, |min| v < min) {
            self.min_value = Some(v);
        }
        if self.max_value.map_or(true, |max| v > max) {
            self.max_value = Some(v);
        }
        if self.first_value.is_none() {
            self.first_value = Some(v);
        }
        self.last_value = Some(v);
        self.sum += v.to_f64();
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
        if let Some(min) = other.min_value {
            self.update_min(min);
        }
        if let Some(max) = other.max_value {
            self.update_max(max);
        }
        self.last_value = other.last_value;
        self.sum += other.sum;
        self.count += other.count;
    }

    fn update_min(&mut self, v: T) {
        if self.min_value.map_or(true, |min| v < min) {
            self.min_value = Some(v);
        }
    }

    fn update_max(&mut self, v: T) {
        if self.max_value.map_or(true, |max| v > max) {
            self.max_value = Some(v);
        }
    }
}
