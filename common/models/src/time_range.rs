use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub min_ts: i64,
    pub max_ts: i64,
}

impl TimeRange {
    pub fn new(min_ts: i64, max_ts: i64) -> Self {
        Self { min_ts, max_ts }
    }

    /// An empty range that any `merge` will overwrite.
    pub fn none() -> Self {
        Self {
            min_ts: Timestamp::MAX,
            max_ts: Timestamp::MIN,
        }
    }

    pub fn is_none(&self) -> bool {
        self.min_ts > self.max_ts
    }

    #[inline(always)]
    pub fn merge(&mut self, other: &TimeRange) {
        self.min_ts = self.min_ts.min(other.min_ts);
        self.max_ts = self.max_ts.max(other.max_ts);
    }
}

impl From<(Timestamp, Timestamp)> for TimeRange {
    fn from(time_range: (Timestamp, Timestamp)) -> Self {
        Self {
            min_ts: time_range.0,
            max_ts: time_range.1,
        }
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min_ts, self.max_ts)
    }
}

#[cfg(test)]
mod test {
    use super::TimeRange;

    #[test]
    fn test_merge() {
        let mut tr = TimeRange::none();
        assert!(tr.is_none());
        tr.merge(&TimeRange::new(5, 10));
        assert_eq!(tr, TimeRange::new(5, 10));
        tr.merge(&TimeRange::new(1, 3));
        assert_eq!(tr, TimeRange::new(1, 10));
    }
}
