use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanStatistics {
    pub count: u64,
    pub true_count: u64,
    pub first_value: Option<bool>,
    pub last_value: Option<bool>,
}

impl BooleanStatistics {
    pub fn update(&mut self, v: bool) {
        if self.first_value.is_none() {
            self.first_value = Some(v);
        }
        self.last_value = Some(v);
        self.true_count += v as u64;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.first_value.is_none() {
            self.first_value = other.first_value;
        }
        self.last_value = other.last_value;
        self.true_count += other.true_count;
        self.count += other.count;
    }
}
