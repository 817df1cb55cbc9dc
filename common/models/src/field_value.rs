use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::errors::{Error, Result};
use crate::value_type::DataType;

/// One value of a series; the tag must match the series' data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldVal {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Binary(Vec<u8>),
}

impl FieldVal {
    pub fn data_type(&self) -> DataType {
        match self {
            FieldVal::Boolean(_) => DataType::Boolean,
            FieldVal::Int32(_) => DataType::Int32,
            FieldVal::Int64(_) => DataType::Int64,
            FieldVal::Float(_) => DataType::Float,
            FieldVal::Double(_) => DataType::Double,
            FieldVal::Decimal(_) => DataType::Decimal,
            FieldVal::Binary(_) => DataType::Binary,
        }
    }

    /// Checks the value can be written to a series of type `expected`.
    pub fn check_type(&self, expected: DataType) -> Result<()> {
        let actual = self.data_type();
        if actual == expected.physical_type() {
            Ok(())
        } else {
            Err(Error::TypeMismatch { expected, actual })
        }
    }
}

impl From<bool> for FieldVal {
    fn from(v: bool) -> Self {
        FieldVal::Boolean(v)
    }
}

impl From<i32> for FieldVal {
    fn from(v: i32) -> Self {
        FieldVal::Int32(v)
    }
}

impl From<i64> for FieldVal {
    fn from(v: i64) -> Self {
        FieldVal::Int64(v)
    }
}

impl From<f32> for FieldVal {
    fn from(v: f32) -> Self {
        FieldVal::Float(v)
    }
}

impl From<f64> for FieldVal {
    fn from(v: f64) -> Self {
        FieldVal::Double(v)
    }
}

impl From<Decimal> for FieldVal {
    fn from(v: Decimal) -> Self {
        FieldVal::Decimal(v)
    }
}

impl From<Vec<u8>> for FieldVal {
    fn from(v: Vec<u8>) -> Self {
        FieldVal::Binary(v)
    }
}

impl From<&str> for FieldVal {
    fn from(v: &str) -> Self {
        FieldVal::Binary(v.as_bytes().to_vec())
    }
}
