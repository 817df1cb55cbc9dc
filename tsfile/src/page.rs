use bytes::Bytes;
use models::codec::Compression;
use models::schema::MeasurementDescriptor;
use models::{DataType, FieldVal, TimeRange};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::byte_utils::decode_be_u32;
use crate::error::{Error, Result, SerializeSnafu};
use crate::file_writer::{ChunkMetadata, ChunkWriter};
use crate::statistics::Statistics;
use crate::value_writer::decode_page;

/// Receives the pages of one series and packs them into a chunk.
pub trait PageSink {
    /// Accepts one page. The sink owns `bytes` afterwards.
    ///
    /// Fails with [`Error::Page`] when the page cannot be accepted.
    fn write_page(
        &mut self,
        bytes: Bytes,
        value_count: usize,
        statistics: &Statistics,
        max_time: i64,
        min_time: i64,
    ) -> Result<()>;

    /// Memory held by the pages accepted so far.
    fn estimate_max_page_mem_size(&self) -> usize;

    /// Emits the buffered pages as one chunk carrying `series_statistics`.
    fn write_to_file_writer(
        &mut self,
        file_writer: &mut dyn ChunkWriter,
        series_statistics: &Statistics,
    ) -> Result<()>;

    fn reset(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageHeader {
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    pub num_values: u32,
    pub max_timestamp: i64,
    pub min_timestamp: i64,
    pub statistics: Statistics,
}

/// Default [`PageSink`]: every page is compressed, prefixed by its header
/// length (u32 BE) and bincode header, and appended to the chunk buffer.
#[derive(Debug)]
pub struct PageWriter {
    desc: MeasurementDescriptor,
    buffer: Vec<u8>,
    num_values: u64,
    num_pages: u32,
    time_range: TimeRange,
    max_chunk_size: Option<usize>,
}

impl PageWriter {
    pub fn new(desc: MeasurementDescriptor) -> Self {
        Self {
            desc,
            buffer: Vec::new(),
            num_values: 0,
            num_pages: 0,
            time_range: TimeRange::none(),
            max_chunk_size: None,
        }
    }

    /// Pages that would grow the chunk buffer past `max_chunk_size` are rejected.
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = Some(max_chunk_size);
        self
    }

    pub fn num_values(&self) -> u64 {
        self.num_values
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn chunk_buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        match self.desc.compression() {
            Compression::Uncompressed => Ok(bytes.to_vec()),
            Compression::Snappy => snap::raw::Encoder::new()
                .compress_vec(bytes)
                .map_err(|e| Error::Encoding { source: Box::new(e) }),
        }
    }
}

impl PageSink for PageWriter {
    fn write_page(
        &mut self,
        bytes: Bytes,
        value_count: usize,
        statistics: &Statistics,
        max_time: i64,
        min_time: i64,
    ) -> Result<()> {
        if value_count == 0 {
            return Err(Error::Page {
                reason: "page has no values".to_string(),
            });
        }
        let data = self.compress(&bytes)?;
        let header = PageHeader {
            uncompressed_size: page_u32(bytes.len(), "uncompressed size")?,
            compressed_size: page_u32(data.len(), "compressed size")?,
            num_values: page_u32(value_count, "value count")?,
            max_timestamp: max_time,
            min_timestamp: min_time,
            statistics: statistics.clone(),
        };
        let header_buf = bincode::serialize(&header).context(SerializeSnafu)?;

        let page_size = 4 + header_buf.len() + data.len();
        if let Some(limit) = self.max_chunk_size {
            if self.buffer.len() + page_size > limit {
                return Err(Error::Page {
                    reason: format!(
                        "chunk of {} would grow to {} bytes, limit is {}",
                        self.desc.measurement_id(),
                        self.buffer.len() + page_size,
                        limit
                    ),
                });
            }
        }

        self.buffer.reserve(page_size);
        self.buffer
            .extend_from_slice(&(header_buf.len() as u32).to_be_bytes());
        self.buffer.extend_from_slice(&header_buf);
        self.buffer.extend_from_slice(&data);
        self.num_values += value_count as u64;
        self.num_pages += 1;
        self.time_range.merge(&TimeRange::new(min_time, max_time));
        Ok(())
    }

    fn estimate_max_page_mem_size(&self) -> usize {
        self.buffer.len()
    }

    fn write_to_file_writer(
        &mut self,
        file_writer: &mut dyn ChunkWriter,
        series_statistics: &Statistics,
    ) -> Result<()> {
        let meta = ChunkMetadata {
            device_id: String::new(),
            measurement_id: self.desc.measurement_id().to_string(),
            data_type: self.desc.data_type(),
            time_encoding: self.desc.time_encoding(),
            value_encoding: self.desc.value_encoding(),
            compression: self.desc.compression(),
            num_values: self.num_values,
            num_pages: self.num_pages,
            time_range: self.time_range,
            statistics: series_statistics.clone(),
            enum_values: self.desc.converter().and_then(|c| c.data_values()),
            offset: 0,
            size: 0,
        };
        file_writer.write_chunk(meta, &self.buffer)
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.num_values = 0;
        self.num_pages = 0;
        self.time_range = TimeRange::none();
    }
}

fn page_u32(n: usize, what: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::Page {
        reason: format!("page {} {} does not fit in u32", what, n),
    })
}

/// One decoded page of a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPage {
    pub header: PageHeader,
    pub times: Vec<i64>,
    pub values: Vec<FieldVal>,
}

/// Splits the data of a chunk written by [`PageWriter`] back into pages.
pub fn decode_chunk(
    data: &[u8],
    data_type: DataType,
    compression: Compression,
) -> Result<Vec<DecodedPage>> {
    let mut pages = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let header_len = decode_be_u32(&data[pos..]).ok_or_else(|| Error::OutOfSpec {
            reason: "truncated page header length".to_string(),
        })? as usize;
        pos += 4;
        let header_buf = data.get(pos..pos + header_len).ok_or_else(|| Error::OutOfSpec {
            reason: "truncated page header".to_string(),
        })?;
        let header: PageHeader = bincode::deserialize(header_buf).context(SerializeSnafu)?;
        pos += header_len;

        let compressed_size = header.compressed_size as usize;
        let page_data = data
            .get(pos..pos + compressed_size)
            .ok_or_else(|| Error::OutOfSpec {
                reason: "truncated page data".to_string(),
            })?;
        pos += compressed_size;

        let (times, values) = match compression {
            Compression::Uncompressed => decode_page(data_type, page_data)?,
            Compression::Snappy => {
                let raw = snap::raw::Decoder::new()
                    .decompress_vec(page_data)
                    .map_err(|e| Error::Decoding { source: Box::new(e) })?;
                decode_page(data_type, &raw)?
            }
        };
        pages.push(DecodedPage {
            header,
            times,
            values,
        });
    }
    Ok(pages)
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use models::codec::{Compression, Encoding};
    use models::schema::MeasurementDescriptor;
    use models::{DataType, FieldVal};

    use super::{decode_chunk, PageSink, PageWriter};
    use crate::file_writer::TsFileIoWriter;
    use crate::statistics::Statistics;
    use crate::value_writer::ValueWriter;
    use crate::Error;

    fn page(desc: &MeasurementDescriptor, points: &[(i64, i64)]) -> (Bytes, Statistics) {
        let mut writer = ValueWriter::new(desc);
        let mut stats = Statistics::new(desc.data_type());
        for (t, v) in points {
            writer.write(*t, &FieldVal::Int64(*v)).unwrap();
            stats.update(&FieldVal::Int64(*v)).unwrap();
        }
        (writer.get_bytes().unwrap(), stats)
    }

    #[test]
    fn test_pages_into_chunk() {
        for compression in [Compression::Uncompressed, Compression::Snappy] {
            let desc = MeasurementDescriptor::new("s1", DataType::Int64, Encoding::Default)
                .unwrap()
                .with_compression(compression);
            let mut sink = PageWriter::new(desc.clone());

            let (bytes, stats) = page(&desc, &[(1, 10), (2, 20)]);
            sink.write_page(bytes, 2, &stats, 2, 1).unwrap();
            let (bytes, stats) = page(&desc, &[(5, 50)]);
            sink.write_page(bytes, 1, &stats, 5, 5).unwrap();

            assert_eq!(sink.num_pages(), 2);
            assert_eq!(sink.num_values(), 3);
            assert_eq!(sink.time_range().min_ts, 1);
            assert_eq!(sink.time_range().max_ts, 5);
            assert_eq!(
                sink.estimate_max_page_mem_size(),
                sink.chunk_buffer().len()
            );

            let pages = decode_chunk(sink.chunk_buffer(), DataType::Int64, compression).unwrap();
            assert_eq!(pages.len(), 2);
            assert_eq!(pages[0].times, vec![1, 2]);
            assert_eq!(pages[0].header.num_values, 2);
            assert_eq!(pages[0].header.min_timestamp, 1);
            assert_eq!(pages[1].values, vec![FieldVal::Int64(50)]);
            assert_eq!(
                pages[1].header.statistics.max_value(),
                Some(FieldVal::Int64(50))
            );

            let mut file_writer = TsFileIoWriter::new(Vec::new()).unwrap();
            file_writer.start_chunk_group("root.d1").unwrap();
            sink.write_to_file_writer(&mut file_writer, &stats).unwrap();
            assert_eq!(file_writer.chunks()[0].num_pages, 2);
            assert_eq!(file_writer.chunks()[0].compression, compression);

            sink.reset();
            assert_eq!(sink.estimate_max_page_mem_size(), 0);
            assert_eq!(sink.num_pages(), 0);
            assert!(sink.time_range().is_none());
        }
    }

    #[test]
    fn test_reject_page() {
        let desc = MeasurementDescriptor::new("s1", DataType::Int64, Encoding::Default).unwrap();
        let mut sink = PageWriter::new(desc.clone()).with_max_chunk_size(16);
        let (bytes, stats) = page(&desc, &[(1, 10), (2, 20)]);
        assert!(matches!(
            sink.write_page(bytes.clone(), 2, &stats, 2, 1),
            Err(Error::Page { .. })
        ));
        assert!(matches!(
            PageWriter::new(desc).write_page(bytes, 0, &stats, 2, 1),
            Err(Error::Page { .. })
        ));
        assert_eq!(sink.num_pages(), 0);
        assert_eq!(sink.estimate_max_page_mem_size(), 0);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_reject_oversized_count() {
        let desc = MeasurementDescriptor::new("s1", DataType::Int64, Encoding::Default).unwrap();
        let mut sink = PageWriter::new(desc.clone());
        let (bytes, stats) = page(&desc, &[(1, 10)]);
        let value_count = u32::MAX as usize + 1;
        assert!(matches!(
            sink.write_page(bytes, value_count, &stats, 1, 1),
            Err(Error::Page { .. })
        ));
        assert_eq!(sink.num_pages(), 0);
        assert_eq!(sink.num_values(), 0);
    }
}
