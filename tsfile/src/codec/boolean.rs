use bitvec::prelude::*;
use integer_encoding::VarInt;
use models::codec::Encoding;
use models::FieldVal;

use super::{unexpected_value, CodecError, ValueEncoder, MAX_VAR_INT_64};

fn bool_value(value: &FieldVal) -> Result<bool, CodecError> {
    match value {
        FieldVal::Boolean(v) => Ok(*v),
        _ => Err(unexpected_value("BOOLEAN", value)),
    }
}

/// One byte per value.
#[derive(Debug, Default)]
pub struct PlainBoolEncoder {
    buf: Vec<u8>,
}

impl ValueEncoder for PlainBoolEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::Plain
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        self.buf.push(bool_value(value)? as u8);
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

/// Eight values per byte, preceded by the value count.
#[derive(Debug, Default)]
pub struct BitPackBoolEncoder {
    bits: BitVec<u8, Msb0>,
}

impl ValueEncoder for BitPackBoolEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::BitPack
    }

    fn encode(&mut self, value: &FieldVal) -> Result<(), CodecError> {
        self.bits.push(bool_value(value)?);
        Ok(())
    }

    fn max_byte_size(&self) -> usize {
        if self.bits.is_empty() {
            0
        } else {
            1 + MAX_VAR_INT_64 + (self.bits.len() + 7) / 8
        }
    }

    fn flush(&self, dst: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.bits.is_empty() {
            return Ok(());
        }
        dst.push(Encoding::BitPack as u8);
        let mut tmp = [0_u8; MAX_VAR_INT_64];
        let n = (self.bits.len() as u64).encode_var(&mut tmp);
        dst.extend_from_slice(&tmp[..n]);
        dst.extend_from_slice(self.bits.as_raw_slice());
        Ok(())
    }

    fn reset(&mut self) {
        self.bits.clear();
    }
}

pub fn decode_bool_block(src: &[u8], dst: &mut Vec<bool>) -> Result<(), CodecError> {
    if src.is_empty() {
        return Ok(());
    }
    match Encoding::from(src[0]) {
        Encoding::Plain => {
            dst.extend(src[1..].iter().map(|b| *b != 0));
            Ok(())
        }
        Encoding::BitPack => {
            let (count, n) = u64::decode_var(&src[1..]).ok_or("invalid bitpack count")?;
            let bits = src[1 + n..].view_bits::<Msb0>();
            if (count as usize) > bits.len() {
                return Err("bitpack block truncated".into());
            }
            dst.extend(bits[..count as usize].iter().map(|b| *b));
            Ok(())
        }
        other => Err(format!("unexpected boolean block encoding {}", other).into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bitpack_size() {
        let mut encoder = BitPackBoolEncoder::default();
        for i in 0..20 {
            encoder.encode(&FieldVal::Boolean(i % 2 == 0)).unwrap();
        }
        let mut buf = Vec::new();
        encoder.flush(&mut buf).unwrap();
        assert_eq!(buf.len(), 1 + 1 + 3);

        let mut dst = Vec::new();
        decode_bool_block(&buf, &mut dst).unwrap();
        assert_eq!(dst.len(), 20);
        assert!(dst[0]);
        assert!(!dst[19]);
    }
}
