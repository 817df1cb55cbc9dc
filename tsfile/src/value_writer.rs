use bytes::Bytes;
use integer_encoding::VarInt;
use models::schema::MeasurementDescriptor;
use models::{DataType, FieldVal};
use snafu::ResultExt;

use crate::codec::{
    decode_timestamps, decode_values, get_time_encoder, get_value_encoder, TimeEncoder,
    ValueEncoder,
};
use crate::error::{DecodingSnafu, EncodingSnafu, Error, Result};

/// Room reserved for the varint length of the time block.
const TIME_LENGTH_HEADROOM: usize = 10;

/// Buffers the points of the current page. Points are encoded as they are
/// written; `get_bytes` only concatenates the two encoded columns.
///
/// Page layout: varint length of the time block, the time block, the value block.
#[derive(Debug)]
pub struct ValueWriter {
    data_type: DataType,
    time_encoder: Box<dyn TimeEncoder>,
    value_encoder: Box<dyn ValueEncoder>,
    count: usize,
}

impl ValueWriter {
    pub fn new(desc: &MeasurementDescriptor) -> Self {
        Self::with_encoders(
            desc.data_type(),
            get_time_encoder(desc.time_encoding()),
            get_value_encoder(desc.data_type(), desc.value_encoding()),
        )
    }

    pub fn with_encoders(
        data_type: DataType,
        time_encoder: Box<dyn TimeEncoder>,
        value_encoder: Box<dyn ValueEncoder>,
    ) -> Self {
        Self {
            data_type,
            time_encoder,
            value_encoder,
            count: 0,
        }
    }

    pub fn write(&mut self, time: i64, value: &FieldVal) -> Result<()> {
        value.check_type(self.data_type)?;
        self.value_encoder.encode(value).context(EncodingSnafu)?;
        self.time_encoder.encode(time);
        self.count += 1;
        Ok(())
    }

    /// Upper bound of the size of `get_bytes`, without encoding anything.
    /// 0 when neither encoder holds any bytes.
    pub fn estimate_max_mem_size(&self) -> usize {
        let encoded = self.time_encoder.max_byte_size() + self.value_encoder.max_byte_size();
        if encoded == 0 {
            return 0;
        }
        TIME_LENGTH_HEADROOM + encoded
    }

    pub fn get_bytes(&self) -> Result<Bytes> {
        let mut time_block = Vec::with_capacity(self.time_encoder.max_byte_size());
        self.time_encoder
            .flush(&mut time_block)
            .context(EncodingSnafu)?;

        let mut buf = Vec::with_capacity(self.estimate_max_mem_size());
        let mut tmp = [0_u8; TIME_LENGTH_HEADROOM];
        let n = (time_block.len() as u64).encode_var(&mut tmp);
        buf.extend_from_slice(&tmp[..n]);
        buf.extend_from_slice(&time_block);
        self.value_encoder.flush(&mut buf).context(EncodingSnafu)?;
        Ok(Bytes::from(buf))
    }

    pub fn reset(&mut self) {
        self.time_encoder.reset();
        self.value_encoder.reset();
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Reverses [`ValueWriter::get_bytes`].
pub fn decode_page(data_type: DataType, src: &[u8]) -> Result<(Vec<i64>, Vec<FieldVal>)> {
    let (time_len, n) = u64::decode_var(src).ok_or_else(|| Error::OutOfSpec {
        reason: "page has no time block length".to_string(),
    })?;
    let time_end = n + time_len as usize;
    if time_end > src.len() {
        return Err(Error::OutOfSpec {
            reason: format!("time block of {} bytes overflows the page", time_len),
        });
    }

    let mut times = Vec::new();
    decode_timestamps(&src[n..time_end], &mut times).context(DecodingSnafu)?;
    let mut values = Vec::with_capacity(times.len());
    decode_values(data_type, &src[time_end..], &mut values).context(DecodingSnafu)?;
    if times.len() != values.len() {
        return Err(Error::OutOfSpec {
            reason: format!(
                "page has {} timestamps but {} values",
                times.len(),
                values.len()
            ),
        });
    }
    Ok((times, values))
}
