use integer_encoding::VarInt;
use models::codec::Encoding;
use models::FieldVal;

use super::{unexpected_value, CodecError, TimeEncoder, ValueEncoder, MAX_VAR_INT_64};
use crate::byte_utils::{decode_be_i32, decode_be_i64};

/// Byte width of a plain encoded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W32,
    W64,
}

/// Layout of a delta block, stored in the high 4 bits of its second byte.
#[derive(Debug, Clone, Copy)]
pub enum DeltaEncoding {
    Varint = 1,
    Rle = 2,
}

#[derive(Debug)]
pub struct PlainIntEncoder {
    width: IntWidth,
    buf: Vec<u8>,
}

impl PlainIntEncoder {
    pub fn new(width: IntWidth) -> Self {
        Self {
            width,
            buf: Vec::new(),
        }
    }

    pub fn push(&mut self, v: i64) {
        match self.width {
            IntWidth::W32 => self.buf.extend_from_slice(&(v as i32).to_be_bytes()),
            IntWidth::W64 => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn block_size(&self) -> usize {
        if self.buf.is_empty() {
            0
        } else {
            1 + self.buf.len()
        }
    }

    fn write_block(&self, dst: &mut Vec<u8>) {
        if self.buf.is_empty() {
            return;
        }
        dst.push(Encoding::Plain as u8);
        dst.extend_from_slice(&self.buf);
    }
}

/// Zig-zag delta encoder. The first value is stored as 8 bytes, then every
/// delta as a varint; a block whose deltas are all equal is run-length encoded.
#[derive(Debug)]
pub struct DeltaIntEncoder {
    width: IntWidth,
    first: Option<i64>,
    prev: i64,
    run_delta: Option<i64>,
    is_rle: bool,
    count: u64,
    deltas: Vec<u8>,
}

impl DeltaIntEncoder {
    pub fn new(width: IntWidth) -> Self {
        Self {
            width,
            first: None,
            prev: 0,
            run_delta: None,
            is_rle: true,
            count: 0,
            deltas: Vec::new(),
        }
    }

    pub fn push(&mut self, v: i64) {
        if self.first.is_none() {
            self.first = Some(v);
        } else {
            let delta = v.wrapping_sub(self.prev);
            match self.run_delta {
                None => self.run_delta = Some(delta),
                Some(d) if d != delta => self.is_rle = false,
                _ => {}
            }
            let mut tmp = [0_u8; MAX_VAR_INT_64];
            let n = delta.encode_var(&mut tmp);
            self.deltas.extend_from_slice(&tmp[..n]);
        }
        self.prev = v;
        self.count += 1;
    }

    fn block_size(&self) -> usize {
        if self.first.is_none() {
            0
        } else {
            2 + 8 + self.deltas.len() + MAX_VAR_INT_64
        }
    }

    fn write_block(&self, dst: &mut Vec<u8>) {
        let first = match self.first {
            Some(first) => first,
            None => return,
        };
        dst.push(Encoding::Delta as u8);
        let mut tmp = [0_u8; MAX_VAR_INT_64];
        match self.run_delta {
            Some(run_delta) if self.is_rle && self.count > 2 => {
                dst.push((DeltaEncoding::Rle as u8) << 4);
                dst.extend_from_slice(&first.to_be_bytes());
                let n = run_delta.encode_var(&mut tmp);
                dst.extend_from_slice(&tmp[..n]);
                let n = (self.count - 1).encode_var(&mut tmp);
                dst.extend_from_slice(&tmp[..n]);
            }
            _ => {
                dst.push((DeltaEncoding::Varint as u8) << 4);
                dst.extend_from_slice(&first.to_be_bytes());
                dst.extend_from_slice(&self.deltas);
            }
        }
    }

    fn clear(&mut self) {
        self.first = None;
        self.prev = 0;
        self.run_delta = None;
        self.is_rle = true;
        self.count = 0;
        self.deltas.clear();
    }
}

impl TimeEncoder for PlainIntEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    fn encode(&mut self, ts: i64) {
        self.push(ts);
    }

    fn max_byte_size(&self) -> usize {
        self.block_size()
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        self.write_block(dst);
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.clear();
    }
}

impl TimeEncoder for DeltaIntEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Delta
    }

    fn encode(&mut self, ts: i64) {
        self.push(ts);
    }

    fn max_byte_size(&self) -> usize {
        self.block_size()
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        self.write_block(dst);
        Ok(())
    }

    fn reset(&mut self) {
        self.clear();
    }
}

fn int_value(width: IntWidth, value: &FieldVal) -> Result<i64, CodecError> {
    match (width, value) {
        (IntWidth::W32, FieldVal::Int32(v)) => Ok(*v as i64),
        (IntWidth::W64, FieldVal::Int64(v)) => Ok(*v),
        (IntWidth::W32, _) => Err(unexpected_value("INT32", value)),
        (IntWidth::W64, _) => Err(unexpected_value("INT64", value)),
    }
}

impl ValueEncoder for PlainIntEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        let v = int_value(self.width, value)?;
        self.push(v);
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        self.block_size()
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        self.write_block(dst);
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.clear();
    }
}

impl ValueEncoder for DeltaIntEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Delta
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        let v = int_value(self.width, value)?;
        self.push(v);
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        self.block_size()
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        self.write_block(dst);
        Ok(())
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// Decodes a plain or delta integer block into `dst`.
pub fn decode_int_block(
    width: IntWidth,
    src: &[u8],
    dst: &mut Vec<i64>,
) -> Result<(), CodecError> {
    if src.is_empty() {
        return Ok(());
    }
    match Encoding::from(src[0]) {
        Encoding::Plain => decode_plain(width, &src[1..], dst),
        Encoding::Delta => decode_delta(&src[1..], dst),
        other => Err(format!("unexpected integer block encoding {}", other).into()),
    }
}

fn decode_plain(width: IntWidth, src: &[u8], dst: &mut Vec<i64>) -> Result<(), CodecError> {
    let size = match width {
        IntWidth::W32 => 4,
        IntWidth::W64 => 8,
    };
    if src.len() % size != 0 {
        return Err(format!(
            "plain integer block length {} is not a multiple of {}",
            src.len(),
            size
        )
        .into());
    }
    for chunk in src.chunks_exact(size) {
        let v = match width {
            IntWidth::W32 => decode_be_i32(chunk).map(|v| v as i64),
            IntWidth::W64 => decode_be_i64(chunk),
        };
        dst.push(v.ok_or("truncated plain integer")?);
    }
    Ok(())
}

fn decode_delta(src: &[u8], dst: &mut Vec<i64>) -> Result<(), CodecError> {
    if src.len() < 9 {
        return Err("delta block too short".into());
    }
    let first = decode_be_i64(&src[1..]).ok_or("truncated delta header")?;
    let mut pos = 9;
    let mut prev = first;
    dst.push(first);
    match src[0] >> 4 {
        1 => {
            while pos < src.len() {
                let (delta, n) = i64::decode_var(&src[pos..]).ok_or("invalid delta varint")?;
                pos += n;
                prev = prev.wrapping_add(delta);
                dst.push(prev);
            }
        }
        2 => {
            let (delta, n) = i64::decode_var(&src[pos..]).ok_or("invalid rle delta")?;
            pos += n;
            let (count, _) = u64::decode_var(&src[pos..]).ok_or("invalid rle count")?;
            for _ in 0..count {
                prev = prev.wrapping_add(delta);
                dst.push(prev);
            }
        }
        sub => return Err(format!("unknown delta block layout {}", sub).into()),
    }
    Ok(())
}
