//! Streaming encoders for the time column and the value column of a page.
//!
//! Every encoded block starts with one byte holding its [`Encoding`], so the
//! decoders can dispatch on the block itself.

use std::error::Error;
use std::fmt::Debug;

use models::codec::Encoding;
use models::{DataType, FieldVal};

pub use binary::{PlainBinaryEncoder, SnappyBinaryEncoder};
pub use boolean::{BitPackBoolEncoder, PlainBoolEncoder};
pub use float::{FloatWidth, GorillaEncoder, PlainFloatEncoder};
pub use integer::{DeltaEncoding, DeltaIntEncoder, IntWidth, PlainIntEncoder};

mod binary;
mod boolean;
mod float;
mod integer;

pub type CodecError = Box<dyn Error + Send + Sync>;

/// Max number of bytes needed to store a varint-encoded 64-bit integer.
const MAX_VAR_INT_64: usize = 10;

/// Encoder of the time column. Timestamps are encoded as they arrive.
pub trait TimeEncoder: Send + Debug {
    fn encoding(&self) -> Encoding;

    fn encode(&mut self, ts: i64);

    /// Upper bound of the bytes `flush` would append right now.
    fn max_byte_size(&self) -> usize;

    /// Appends the encoded block to `dst`; the encoder state is left untouched.
    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError>;

    fn reset(&mut self);
}

/// Encoder of the value column of one data type.
pub trait ValueEncoder: Send + Debug {
    fn encoding(&self) -> Encoding;

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError>;

    /// Upper bound of the bytes `flush` would append right now.
    fn max_byte_size(&self) -> usize;

    /// Appends the encoded block to `dst`; the encoder state is left untouched.
    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError>;

    fn reset(&mut self);
}

pub fn get_encoding(src: &[u8]) -> Encoding {
    if src.is_empty() {
        return Encoding::Unknown;
    }
    Encoding::from(src[0])
}

pub fn get_time_encoder(encoding: Encoding) -> Box<dyn TimeEncoder> {
    match encoding.resolve_for_time() {
        Encoding::Plain => Box::new(PlainIntEncoder::new(IntWidth::W64)),
        _ => Box::new(DeltaIntEncoder::new(IntWidth::W64)),
    }
}

/// Returns the encoder for `data_type` values. Combinations a descriptor
/// would reject fall back to plain encoding.
pub fn get_value_encoder(data_type: DataType, encoding: Encoding) -> Box<dyn ValueEncoder> {
    let encoding = encoding.resolve_for_value(data_type);
    match data_type.physical_type() {
        DataType::Int32 | DataType::Int64 => {
            let width = match data_type.physical_type() {
                DataType::Int32 => IntWidth::W32,
                _ => IntWidth::W64,
            };
            match encoding {
                Encoding::Delta => Box::new(DeltaIntEncoder::new(width)),
                _ => Box::new(PlainIntEncoder::new(width)),
            }
        }
        DataType::Float | DataType::Double => {
            let width = match data_type {
                DataType::Float => FloatWidth::F32,
                _ => FloatWidth::F64,
            };
            match encoding {
                Encoding::Gorilla => Box::new(GorillaEncoder::new(width)),
                _ => Box::new(PlainFloatEncoder::new(width)),
            }
        }
        DataType::Boolean => match encoding {
            Encoding::BitPack => Box::new(BitPackBoolEncoder::default()),
            _ => Box::new(PlainBoolEncoder::default()),
        },
        _ => match encoding {
            Encoding::Snappy => Box::new(SnappyBinaryEncoder::new(data_type)),
            _ => Box::new(PlainBinaryEncoder::new(data_type)),
        },
    }
}

pub fn decode_timestamps(src: &[u8], dst: &mut Vec<i64>) -> Result<(), CodecError> {
    integer::decode_int_block(IntWidth::W64, src, dst)
}

/// Decodes a value block written by the encoder of `data_type`.
pub fn decode_values(
    data_type: DataType,
    src: &[u8],
    dst: &mut Vec<FieldVal>,
) -> Result<(), CodecError> {
    match data_type.physical_type() {
        DataType::Int32 => {
            let mut ints = Vec::new();
            integer::decode_int_block(IntWidth::W32, src, &mut ints)?;
            dst.extend(ints.into_iter().map(|v| FieldVal::Int32(v as i32)));
        }
        DataType::Int64 => {
            let mut ints = Vec::new();
            integer::decode_int_block(IntWidth::W64, src, &mut ints)?;
            dst.extend(ints.into_iter().map(FieldVal::Int64));
        }
        DataType::Float => {
            let mut floats = Vec::new();
            float::decode_float_block(FloatWidth::F32, src, &mut floats)?;
            dst.extend(floats.into_iter().map(|v| FieldVal::Float(v as f32)));
        }
        DataType::Double => {
            let mut floats = Vec::new();
            float::decode_float_block(FloatWidth::F64, src, &mut floats)?;
            dst.extend(floats.into_iter().map(FieldVal::Double));
        }
        DataType::Boolean => {
            let mut bools = Vec::new();
            boolean::decode_bool_block(src, &mut bools)?;
            dst.extend(bools.into_iter().map(FieldVal::Boolean));
        }
        _ => binary::decode_binary_block(data_type, src, dst)?,
    }
    Ok(())
}

pub(crate) fn unexpected_value(expected: &str, value: &FieldVal) -> CodecError {
    format!(
        "{} encoder cannot encode a {} value",
        expected,
        value.data_type()
    )
    .into()
}
