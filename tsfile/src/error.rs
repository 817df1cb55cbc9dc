use models::DataType;
use snafu::Snafu;

use crate::codec::CodecError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{}", source))]
    IO { source: std::io::Error },

    #[snafu(display("Encode error: {}", source))]
    Encoding { source: CodecError },

    #[snafu(display("Decode error: {}", source))]
    Decoding { source: CodecError },

    #[snafu(display("Page rejected: {}", reason))]
    Page { reason: String },

    #[snafu(display("Data type mismatch: expected {}, got {}", expected, actual))]
    TypeMismatch { expected: DataType, actual: DataType },

    #[snafu(display("Timestamp {} is not after the last timestamp {}", time, last_time))]
    OutOfOrder { time: i64, last_time: i64 },

    #[snafu(display("{}", source))]
    Model { source: models::Error },

    #[snafu(display("Failed to serialize: {}", source))]
    Serialize { source: bincode::Error },

    #[snafu(display("File writer is closed"))]
    FileWriterClosed,

    #[snafu(display("Data out of spec: {}", reason))]
    OutOfSpec { reason: String },
}

impl From<models::Error> for Error {
    fn from(source: models::Error) -> Self {
        match source {
            models::Error::TypeMismatch { expected, actual } => {
                Error::TypeMismatch { expected, actual }
            }
            source => Error::Model { source },
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::IO { source }
    }
}

impl From<bincode::Error> for Error {
    fn from(source: bincode::Error) -> Self {
        Error::Serialize { source }
    }
}
