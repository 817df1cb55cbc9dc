use integer_encoding::VarInt;
use models::codec::Encoding;
use models::{DataType, Decimal, FieldVal};

use super::{unexpected_value, CodecError, ValueEncoder, MAX_VAR_INT_64};
use crate::byte_utils::decode_be_i128;

/// Appends one value in the plain layout: binaries as a varint length and the
/// bytes, decimals as a varint scale and the 16 byte big-endian mantissa.
fn write_item(
    data_type: DataType,
    value: &FieldVal,
    buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let mut tmp = [0_u8; MAX_VAR_INT_64];
    match (data_type, value) {
        (DataType::Decimal, FieldVal::Decimal(d)) => {
            let n = d.scale().encode_var(&mut tmp);
            buf.extend_from_slice(&tmp[..n]);
            buf.extend_from_slice(&d.mantissa().to_be_bytes());
        }
        (DataType::Binary, FieldVal::Binary(b)) => {
            let n = (b.len() as u64).encode_var(&mut tmp);
            buf.extend_from_slice(&tmp[..n]);
            buf.extend_from_slice(b);
        }
        (DataType::Decimal, _) => return Err(unexpected_value("DECIMAL", value)),
        _ => return Err(unexpected_value("BINARY", value)),
    }
    Ok(())
}

fn read_items(
    data_type: DataType,
    src: &[u8],
    dst: &mut Vec<FieldVal>,
) -> Result<(), CodecError> {
    let mut pos = 0;
    while pos < src.len() {
        match data_type {
            DataType::Decimal => {
                let (scale, n) = u32::decode_var(&src[pos..]).ok_or("invalid decimal scale")?;
                pos += n;
                let mantissa = decode_be_i128(&src[pos..]).ok_or("truncated decimal")?;
                pos += 16;
                dst.push(FieldVal::Decimal(Decimal::new(mantissa, scale)?));
            }
            _ => {
                let (len, n) = u64::decode_var(&src[pos..]).ok_or("invalid binary length")?;
                pos += n;
                let end = pos + len as usize;
                if end > src.len() {
                    return Err("truncated binary value".into());
                }
                dst.push(FieldVal::Binary(src[pos..end].to_vec()));
                pos = end;
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
pub struct PlainBinaryEncoder {
    data_type: DataType,
    buf: Vec<u8>,
    count: usize,
}

impl PlainBinaryEncoder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            buf: Vec::new(),
            count: 0,
        }
    }
}

impl ValueEncoder for PlainBinaryEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        write_item(self.data_type, value, &mut self.buf)?;
        self.count += 1;
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            1 + self.buf.len()
        }
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.count == 0 {
            return Ok(());
        }
        dst.push(Encoding::Plain as u8);
        dst.extend_from_slice(&self.buf);
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.count = 0;
    }
}

/// Buffers values in the plain layout and snappy-compresses them on flush.
#[derive(Debug)]
pub struct SnappyBinaryEncoder {
    data_type: DataType,
    buf: Vec<u8>,
    count: usize,
}

impl SnappyBinaryEncoder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            buf: Vec::new(),
            count: 0,
        }
    }
}

impl ValueEncoder for SnappyBinaryEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Snappy
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        write_item(self.data_type, value, &mut self.buf)?;
        self.count += 1;
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            1 + snap::raw::max_compress_len(self.buf.len())
        }
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.count == 0 {
            return Ok(());
        }
        let compressed = snap::raw::Encoder::new().compress_vec(&self.buf)?;
        dst.push(Encoding::Snappy as u8);
        dst.extend_from_slice(&compressed);
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.count = 0;
    }
}

pub fn decode_binary_block(
    data_type: DataType,
    src: &[u8],
    dst: &mut Vec<FieldVal>,
) -> Result<(), CodecError> {
    if src.is_empty() {
        return Ok(());
    }
    match Encoding::from(src[0]) {
        Encoding::Plain => read_items(data_type, &src[1..], dst),
        Encoding::Snappy => {
            let raw = snap::raw::Decoder::new().decompress_vec(&src[1..])?;
            read_items(data_type, &raw, dst)
        }
        other => Err(format!("unexpected binary block encoding {}", other).into()),
    }
}
