use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Data type of a measurement, fixed when its series writer is created.
#[derive(Serialize, Deserialize, Debug, PartialEq, Copy, Clone, Eq, Hash, Ord, PartialOrd)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Decimal,
    Binary,
    /// Enumerated text stored as `Int32` ordinals, see [`crate::schema::EnumConverter`].
    Enums,
}

impl DataType {
    /// The type values are physically written and aggregated as.
    pub fn physical_type(&self) -> DataType {
        match self {
            DataType::Enums => DataType::Int32,
            other => *other,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Boolean => f.write_str("BOOLEAN"),
            DataType::Int32 => f.write_str("INT32"),
            DataType::Int64 => f.write_str("INT64"),
            DataType::Float => f.write_str("FLOAT"),
            DataType::Double => f.write_str("DOUBLE"),
            DataType::Decimal => f.write_str("DECIMAL"),
            DataType::Binary => f.write_str("BINARY"),
            DataType::Enums => f.write_str("ENUMS"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BOOLEAN" => Ok(DataType::Boolean),
            "INT32" => Ok(DataType::Int32),
            "INT64" => Ok(DataType::Int64),
            "FLOAT" => Ok(DataType::Float),
            "DOUBLE" => Ok(DataType::Double),
            "DECIMAL" | "BIGDECIMAL" => Ok(DataType::Decimal),
            "BINARY" | "TEXT" => Ok(DataType::Binary),
            "ENUMS" => Ok(DataType::Enums),
            _ => Err(Error::UnknownName {
                kind: "data type",
                name: s.to_string(),
            }),
        }
    }
}
