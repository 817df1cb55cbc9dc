use bitvec::prelude::*;
use integer_encoding::VarInt;
use models::codec::Encoding;
use models::FieldVal;

use super::{unexpected_value, CodecError, ValueEncoder, MAX_VAR_INT_64};
use crate::byte_utils::{decode_be_f32, decode_be_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

fn float_value(width: FloatWidth, value: &FieldVal) -> Result<f64, CodecError> {
    match (width, value) {
        (FloatWidth::F32, FieldVal::Float(v)) => Ok(*v as f64),
        (FloatWidth::F64, FieldVal::Double(v)) => Ok(*v),
        (FloatWidth::F32, _) => Err(unexpected_value("FLOAT", value)),
        (FloatWidth::F64, _) => Err(unexpected_value("DOUBLE", value)),
    }
}

#[derive(Debug)]
pub struct PlainFloatEncoder {
    width: FloatWidth,
    buf: Vec<u8>,
}

impl PlainFloatEncoder {
    pub fn new(width: FloatWidth) -> Self {
        Self {
            width,
            buf: Vec::new(),
        }
    }
}

impl ValueEncoder for PlainFloatEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        let v = float_value(self.width, value)?;
        match self.width {
            FloatWidth::F32 => self.buf.extend_from_slice(&(v as f32).to_be_bytes()),
            FloatWidth::F64 => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        if self.buf.is_empty() {
            0
        } else {
            1 + self.buf.len()
        }
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        dst.push(Encoding::Plain as u8);
        dst.extend_from_slice(&self.buf);
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.clear();
    }
}

/// XOR encoder from the Gorilla paper. `f32` values are widened to `f64`,
/// which is lossless.
///
/// Each value after the first is written as:
/// - `0` when equal to the previous value,
/// - `10` + meaningful bits when the XOR fits the previous window,
/// - `11` + 5 bits leading zeros + 6 bits (length - 1) + meaningful bits.
#[derive(Debug)]
pub struct GorillaEncoder {
    width: FloatWidth,
    bits: BitVec<u8, Msb0>,
    count: u64,
    prev: u64,
    prev_leading: u32,
    prev_trailing: u32,
}

impl GorillaEncoder {
    pub fn new(width: FloatWidth) -> Self {
        Self {
            width,
            bits: BitVec::new(),
            count: 0,
            prev: 0,
            prev_leading: u32::MAX,
            prev_trailing: 0,
        }
    }

    fn push_bits(&mut self, value: u64, n: u32) {
        for i in (0..n).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    fn push(&mut self, v: f64) {
        let bits = v.to_bits();
        if self.count == 0 {
            self.push_bits(bits, 64);
        } else {
            let xor = bits ^ self.prev;
            if xor == 0 {
                self.bits.push(false);
            } else {
                let leading = xor.leading_zeros().min(31);
                let trailing = xor.trailing_zeros();
                if self.prev_leading != u32::MAX
                    && leading >= self.prev_leading
                    && trailing >= self.prev_trailing
                {
                    self.push_bits(0b10, 2);
                    let meaningful = 64 - self.prev_leading - self.prev_trailing;
                    self.push_bits(xor >> self.prev_trailing, meaningful);
                } else {
                    self.push_bits(0b11, 2);
                    let meaningful = 64 - leading - trailing;
                    self.push_bits(leading as u64, 5);
                    self.push_bits((meaningful - 1) as u64, 6);
                    self.push_bits(xor >> trailing, meaningful);
                    self.prev_leading = leading;
                    self.prev_trailing = trailing;
                }
            }
        }
        self.prev = bits;
        self.count += 1;
    }
}

impl ValueEncoder for GorillaEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Gorilla
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        let v = float_value(self.width, value)?;
        self.push(v);
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            1 + MAX_VAR_INT_64 + (self.bits.len() + 7) / 8
        }
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.count == 0 {
            return Ok(());
        }
        dst.push(Encoding::Gorilla as u8);
        let mut tmp = [0_u8; MAX_VAR_INT_64];
        let n = self.count.encode_var(&mut tmp);
        dst.extend_from_slice(&tmp[..n]);
        dst.extend_from_slice(self.bits.as_raw_slice());
        Ok(())
    }

    fn reset(&mut self) {
        self.bits.clear();
        self.count = 0;
        self.prev = 0;
        self.prev_leading = u32::MAX;
        self.prev_trailing = 0;
    }
}

struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn read(&mut self, n: u32) -> Result<u64, CodecError> {
        let end = self.pos + n as usize;
        if end > self.bits.len() {
            return Err("gorilla block truncated".into());
        }
        let mut v = 0_u64;
        for bit in self.bits[self.pos..end].iter() {
            v = (v << 1) | (*bit as u64);
        }
        self.pos = end;
        Ok(v)
    }
}

/// Decodes a plain or Gorilla float block into `dst`; `f32` values are widened.
pub fn decode_float_block(
    width: FloatWidth,
    src: &[u8],
    dst: &mut Vec<f64>,
) -> Result<(), CodecError> {
    if src.is_empty() {
        return Ok(());
    }
    match Encoding::from(src[0]) {
        Encoding::Plain => {
            let size = match width {
                FloatWidth::F32 => 4,
                FloatWidth::F64 => 8,
            };
            let data = &src[1..];
            if data.len() % size != 0 {
                return Err("plain float block has a partial value".into());
            }
            for chunk in data.chunks_exact(size) {
                let v = match width {
                    FloatWidth::F32 => decode_be_f32(chunk).map(|v| v as f64),
                    FloatWidth::F64 => decode_be_f64(chunk),
                };
                dst.push(v.ok_or("truncated plain float")?);
            }
            Ok(())
        }
        Encoding::Gorilla => decode_gorilla(&src[1..], dst),
        other => Err(format!("unexpected float block encoding {}", other).into()),
    }
}

fn decode_gorilla(src: &[u8], dst: &mut Vec<f64>) -> Result<(), CodecError> {
    let (count, n) = u64::decode_var(src).ok_or("invalid gorilla count")?;
    let mut reader = BitReader {
        bits: src[n..].view_bits::<Msb0>(),
        pos: 0,
    };
    let mut prev = 0_u64;
    let mut leading = 0_u32;
    let mut trailing = 0_u32;
    for i in 0..count {
        if i == 0 {
            prev = reader.read(64)?;
        } else if reader.read(1)? == 1 {
            if reader.read(1)? == 1 {
                leading = reader.read(5)? as u32;
                let meaningful = reader.read(6)? as u32 + 1;
                if leading + meaningful > 64 {
                    return Err("invalid gorilla window".into());
                }
                trailing = 64 - leading - meaningful;
            }
            let meaningful = 64 - leading - trailing;
            prev ^= reader.read(meaningful)? << trailing;
        }
        dst.push(f64::from_bits(prev));
    }
    Ok(())
}
