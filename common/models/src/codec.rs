use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::value_type::DataType;

pub const TIMESTAMP_CODEC: [&str; 3] = ["DEFAULT", "PLAIN", "DELTA"];
pub const INTEGER_CODEC: [&str; 3] = ["DEFAULT", "PLAIN", "DELTA"];
pub const FLOAT_CODEC: [&str; 3] = ["DEFAULT", "PLAIN", "GORILLA"];
pub const BOOLEAN_CODEC: [&str; 3] = ["DEFAULT", "PLAIN", "BITPACK"];
pub const BINARY_CODEC: [&str; 3] = ["DEFAULT", "PLAIN", "SNAPPY"];

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Default = 0,
    Plain = 1,
    Delta = 2,
    Gorilla = 6,
    Snappy = 7,
    BitPack = 10,
    Unknown = 15,
}

impl From<u8> for Encoding {
    fn from(value: u8) -> Self {
        match value {
            0 => Encoding::Default,
            1 => Encoding::Plain,
            2 => Encoding::Delta,
            6 => Encoding::Gorilla,
            7 => Encoding::Snappy,
            10 => Encoding::BitPack,
            _ => Encoding::Unknown,
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(codec_to_codec_name(*self as u8))
    }
}

impl Encoding {
    /// Resolves `Default` to the concrete encoding used for `data_type` values.
    pub fn resolve_for_value(self, data_type: DataType) -> Encoding {
        if self != Encoding::Default {
            return self;
        }
        match data_type.physical_type() {
            DataType::Int32 | DataType::Int64 => Encoding::Delta,
            DataType::Float | DataType::Double => Encoding::Gorilla,
            DataType::Boolean => Encoding::BitPack,
            _ => Encoding::Plain,
        }
    }

    /// Resolves `Default` to the concrete encoding used for timestamps.
    pub fn resolve_for_time(self) -> Encoding {
        if self == Encoding::Default {
            Encoding::Delta
        } else {
            self
        }
    }

    pub fn check_time_encoding(self) -> Result<Encoding> {
        if TIMESTAMP_CODEC.contains(&codec_to_codec_name(self as u8)) {
            Ok(self.resolve_for_time())
        } else {
            Err(Error::UnsupportedEncoding {
                data_type: DataType::Int64,
                encoding: self,
            })
        }
    }

    pub fn check_value_encoding(self, data_type: DataType) -> Result<Encoding> {
        let supported: &[&str] = match data_type.physical_type() {
            DataType::Int32 | DataType::Int64 => &INTEGER_CODEC,
            DataType::Float | DataType::Double => &FLOAT_CODEC,
            DataType::Boolean => &BOOLEAN_CODEC,
            _ => &BINARY_CODEC,
        };
        if supported.contains(&codec_to_codec_name(self as u8)) {
            Ok(self.resolve_for_value(data_type))
        } else {
            Err(Error::UnsupportedEncoding {
                data_type,
                encoding: self,
            })
        }
    }
}

pub fn codec_to_codec_name(codec: u8) -> &'static str {
    match Encoding::from(codec) {
        Encoding::Default => "DEFAULT",
        Encoding::Plain => "PLAIN",
        Encoding::Delta => "DELTA",
        Encoding::Gorilla => "GORILLA",
        Encoding::Snappy => "SNAPPY",
        Encoding::BitPack => "BITPACK",
        Encoding::Unknown => "UNKNOWN",
    }
}

pub fn codec_name_to_codec(codec_name: &str) -> u8 {
    match codec_name.to_ascii_uppercase().as_str() {
        "DEFAULT" => 0,
        "PLAIN" => 1,
        "DELTA" => 2,
        "GORILLA" => 6,
        "SNAPPY" => 7,
        "BITPACK" => 10,
        _ => 15,
    }
}

/// Compression applied to a whole page after its points are encoded.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub enum Compression {
    #[default]
    Uncompressed = 0,
    Snappy = 1,
}

impl Compression {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UNCOMPRESSED" | "NONE" => Ok(Compression::Uncompressed),
            "SNAPPY" => Ok(Compression::Snappy),
            _ => Err(Error::UnknownName {
                kind: "compressor",
                name: name.to_string(),
            }),
        }
    }
}

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::Uncompressed => f.write_str("UNCOMPRESSED"),
            Compression::Snappy => f.write_str("SNAPPY"),
        }
    }
}
