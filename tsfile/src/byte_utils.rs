//! Checked big-endian readers used by the decoders.

#[inline(always)]
pub fn decode_be_u32(key: &[u8]) -> Option<u32> {
    key.get(..4)?.try_into().ok().map(u32::from_be_bytes)
}

#[inline(always)]
pub fn decode_be_i32(key: &[u8]) -> Option<i32> {
    key.get(..4)?.try_into().ok().map(i32::from_be_bytes)
}

pub fn decode_be_u64(key: &[u8]) -> Option<u64> {
    key.get(..8)?.try_into().ok().map(u64::from_be_bytes)
}

pub fn decode_be_i64(key: &[u8]) -> Option<i64> {
    key.get(..8)?.try_into().ok().map(i64::from_be_bytes)
}

pub fn decode_be_i128(key: &[u8]) -> Option<i128> {
    key.get(..16)?.try_into().ok().map(i128::from_be_bytes)
}

pub fn decode_be_f32(key: &[u8]) -> Option<f32> {
    key.get(..4)?.try_into().ok().map(f32::from_be_bytes)
}

pub fn decode_be_f64(key: &[u8]) -> Option<f64> {
    key.get(..8)?.try_into().ok().map(f64::from_be_bytes)
}
