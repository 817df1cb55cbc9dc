//! Running aggregates over the values of a page or a whole series.
//!
//! Page statistics are folded into the series statistics in write order, so
//! [`Statistics::merge`] only has to be correct as a left fold: `first` comes
//! from the left side and `last` from the right one.

use models::{DataType, Decimal, FieldVal};
use serde::{Deserialize, Serialize};

pub use binary::BinaryStatistics;
pub use boolean::BooleanStatistics;
pub use primitive::{NativeType, PrimitiveStatistics};

use crate::error::{Error, Result};

mod binary;
mod boolean;
mod primitive;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statistics {
    Boolean(BooleanStatistics),
    Int32(PrimitiveStatistics<i32>),
    Int64(PrimitiveStatistics<i64>),
    Float(PrimitiveStatistics<f32>),
    Double(PrimitiveStatistics<f64>),
    Decimal(PrimitiveStatistics<Decimal>),
    Binary(BinaryStatistics),
}

impl Statistics {
    /// Empty statistics for values of `data_type`.
    pub fn new(data_type: DataType) -> Self {
        match data_type.physical_type() {
            DataType::Boolean => Statistics::Boolean(BooleanStatistics::default()),
            DataType::Int32 => Statistics::Int32(PrimitiveStatistics::default()),
            DataType::Int64 => Statistics::Int64(PrimitiveStatistics::default()),
            DataType::Float => Statistics::Float(PrimitiveStatistics::default()),
            DataType::Double => Statistics::Double(PrimitiveStatistics::default()),
            DataType::Decimal => Statistics::Decimal(PrimitiveStatistics::default()),
            _ => Statistics::Binary(BinaryStatistics::default()),
        }
    }

    /// Physical type of the aggregated values.
    pub fn data_type(&self) -> DataType {
        match self {
            Statistics::Boolean(_) => DataType::Boolean,
            Statistics::Int32(_) => DataType::Int32,
            Statistics::Int64(_) => DataType::Int64,
            Statistics::Float(_) => DataType::Float,
            Statistics::Double(_) => DataType::Double,
            Statistics::Decimal(_) => DataType::Decimal,
            Statistics::Binary(_) => DataType::Binary,
        }
    }

    pub fn update(&mut self, value: &FieldVal) -> Result<()> {
        match (self, value) {
            (Statistics::Boolean(s), FieldVal::Boolean(v)) => s.update(*v),
            (Statistics::Int32(s), FieldVal::Int32(v)) => s.update(*v),
            (Statistics::Int64(s), FieldVal::Int64(v)) => s.update(*v),
            (Statistics::Float(s), FieldVal::Float(v)) => s.update(*v),
            (Statistics::Double(s), FieldVal::Double(v)) => s.update(*v),
            (Statistics::Decimal(s), FieldVal::Decimal(v)) => s.update(*v),
            (Statistics::Binary(s), FieldVal::Binary(v)) => s.update(v),
            (s, v) => {
                return Err(Error::TypeMismatch {
                    expected: s.data_type(),
                    actual: v.data_type(),
                })
            }
        }
        Ok(())
    }

    /// Folds `other`, which aggregates values written after `self`'s, into `self`.
    pub fn merge(&mut self, other: &Statistics) -> Result<()> {
        match (self, other) {
            (Statistics::Boolean(a), Statistics::Boolean(b)) => a.merge(b),
            (Statistics::Int32(a), Statistics::Int32(b)) => a.merge(b),
            (Statistics::Int64(a), Statistics::Int64(b)) => a.merge(b),
            (Statistics::Float(a), Statistics::Float(b)) => a.merge(b),
            (Statistics::Double(a), Statistics::Double(b)) => a.merge(b),
            (Statistics::Decimal(a), Statistics::Decimal(b)) => a.merge(b),
            (Statistics::Binary(a), Statistics::Binary(b)) => a.merge(b),
            (a, b) => {
                return Err(Error::TypeMismatch {
                    expected: a.data_type(),
                    actual: b.data_type(),
                })
            }
        }
        Ok(())
    }

    pub fn count(&self) -> u64 {
        match self {
            Statistics::Boolean(s) => s.count,
            Statistics::Int32(s) => s.count,
            Statistics::Int64(s) => s.count,
            Statistics::Float(s) => s.count,
            Statistics::Double(s) => s.count,
            Statistics::Decimal(s) => s.count,
            Statistics::Binary(s) => s.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Minimum value; booleans have no ordering and return `None`.
    pub fn min_value(&self) -> Option<FieldVal> {
        match self {
            Statistics::Boolean(_) => None,
            Statistics::Int32(s) => s.min_value.map(FieldVal::Int32),
            Statistics::Int64(s) => s.min_value.map(FieldVal::Int64),
            Statistics::Float(s) => s.min_value.map(FieldVal::Float),
            Statistics::Double(s) => s.min_value.map(FieldVal::Double),
            Statistics::Decimal(s) => s.min_value.map(FieldVal::Decimal),
            Statistics::Binary(s) => s.min_value.clone().map(FieldVal::Binary),
        }
    }

    /// Maximum value; booleans have no ordering and return `None`.
    pub fn max_value(&self) -> Option<FieldVal> {
        match self {
            Statistics::Boolean(_) => None,
            Statistics::Int32(s) => s.max_value.map(FieldVal::Int32),
            Statistics::Int64(s) => s.max_value.map(FieldVal::Int64),
            Statistics::Float(s) => s.max_value.map(FieldVal::Float),
            Statistics::Double(s) => s.max_value.map(FieldVal::Double),
            Statistics::Decimal(s) => s.max_value.map(FieldVal::Decimal),
            Statistics::Binary(s) => s.max_value.clone().map(FieldVal::Binary),
        }
    }

    pub fn first_value(&self) -> Option<FieldVal> {
        match self {
            Statistics::Boolean(s) => s.first_value.map(FieldVal::Boolean),
            Statistics::Int32(s) => s.first_value.map(FieldVal::Int32),
            Statistics::Int64(s) => s.first_value.map(FieldVal::Int64),
            Statistics::Float(s) => s.first_value.map(FieldVal::Float),
            Statistics::Double(s) => s.first_value.map(FieldVal::Double),
            Statistics::Decimal(s) => s.first_value.map(FieldVal::Decimal),
            Statistics::Binary(s) => s.first_value.clone().map(FieldVal::Binary),
        }
    }

    pub fn last_value(&self) -> Option<FieldVal> {
        match self {
            Statistics::Boolean(s) => s.last_value.map(FieldVal::Boolean),
            Statistics::Int32(s) => s.last_value.map(FieldVal::Int32),
            Statistics::Int64(s) => s.last_value.map(FieldVal::Int64),
            Statistics::Float(s) => s.last_value.map(FieldVal::Float),
            Statistics::Double(s) => s.last_value.map(FieldVal::Double),
            Statistics::Decimal(s) => s.last_value.map(FieldVal::Decimal),
            Statistics::Binary(s) => s.last_value.clone().map(FieldVal::Binary),
        }
    }

    /// Sum of the values; the number of `true`s for booleans, `None` for binaries.
    pub fn sum(&self) -> Option<f64> {
        match self {
            Statistics::Boolean(s) => Some(s.true_count as f64),
            Statistics::Int32(s) => Some(s.sum),
            Statistics::Int64(s) => Some(s.sum),
            Statistics::Float(s) => Some(s.sum),
            Statistics::Double(s) => Some(s.sum),
            Statistics::Decimal(s) => Some(s.sum),
            Statistics::Binary(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use models::{DataType, FieldVal};

    use super::Statistics;
    use crate::Error;

    #[test]
    fn test_fold_equals_single_pass() {
        let values = [1.0, 5.0, 3.0, 9.0, 2.0];

        let mut single = Statistics::new(DataType::Double);
        for v in values {
            single.update(&FieldVal::Double(v)).unwrap();
        }

        let mut series = Statistics::new(DataType::Double);
        for page in values.chunks(2) {
            let mut page_stats = Statistics::new(DataType::Double);
            for v in page {
                page_stats.update(&FieldVal::Double(*v)).unwrap();
            }
            series.merge(&page_stats).unwrap();
        }

        assert_eq!(series, single);
        assert_eq!(series.count(), 5);
        assert_eq!(series.min_value(), Some(FieldVal::Double(1.0)));
        assert_eq!(series.max_value(), Some(FieldVal::Double(9.0)));
        assert_eq!(series.first_value(), Some(FieldVal::Double(1.0)));
        assert_eq!(series.last_value(), Some(FieldVal::Double(2.0)));
        assert_eq!(series.sum(), Some(20.0));
    }

    #[test]
    fn test_merge_empty() {
        let mut a = Statistics::new(DataType::Int64);
        let empty = Statistics::new(DataType::Int64);
        a.update(&FieldVal::Int64(7)).unwrap();
        let before = a.clone();
        a.merge(&empty).unwrap();
        assert_eq!(a, before);

        let mut b = Statistics::new(DataType::Int64);
        b.merge(&before).unwrap();
        assert_eq!(b, before);
    }

    #[test]
    fn test_type_mismatch() {
        let mut stats = Statistics::new(DataType::Float);
        match stats.update(&FieldVal::Double(1.0)) {
            Err(Error::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, DataType::Float);
                assert_eq!(actual, DataType::Double);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(stats.merge(&Statistics::new(DataType::Boolean)).is_err());
        assert!(stats.is_empty());
    }

    #[test]
    fn test_enums_are_int32() {
        let mut stats = Statistics::new(DataType::Enums);
        assert_eq!(stats.data_type(), DataType::Int32);
        stats.update(&FieldVal::Int32(2)).unwrap();
        stats.update(&FieldVal::Int32(1)).unwrap();
        assert_eq!(stats.min_value(), Some(FieldVal::Int32(1)));
        assert_eq!(stats.max_value(), Some(FieldVal::Int32(2)));
    }

    #[test]
    fn test_bincode() {
        let mut stats = Statistics::new(DataType::Binary);
        stats.update(&FieldVal::from("b")).unwrap();
        stats.update(&FieldVal::from("a")).unwrap();
        let bytes = bincode::serialize(&stats).unwrap();
        let decoded: Statistics = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, stats);
        assert_eq!(decoded.min_value(), Some(FieldVal::from("a")));
        assert_eq!(decoded.first_value(), Some(FieldVal::from("b")));
    }
}
