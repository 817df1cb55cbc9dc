use snafu::Snafu;

use crate::codec::Encoding;
use crate::value_type::DataType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Data type mismatch: expected {}, got {}", expected, actual))]
    TypeMismatch { expected: DataType, actual: DataType },

    #[snafu(display("Encoding {} is not supported by data type {}", encoding, data_type))]
    UnsupportedEncoding {
        data_type: DataType,
        encoding: Encoding,
    },

    #[snafu(display("Data type {} has no converter", data_type))]
    UnsupportedConverter { data_type: DataType },

    #[snafu(display("Invalid metadata args: {}", reason))]
    MetadataArgs { reason: String },

    #[snafu(display("Invalid decimal '{}': {}", text, reason))]
    InvalidDecimal { text: String, reason: String },

    #[snafu(display("Unknown {}: '{}'", kind, name))]
    UnknownName { kind: &'static str, name: String },
}
