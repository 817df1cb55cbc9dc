use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use models::codec::{Compression, Encoding};
use models::{DataType, TimeRange};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use trace::debug;

use crate::byte_utils::decode_be_u32;
use crate::error::{Error, IOSnafu, Result, SerializeSnafu};
use crate::statistics::Statistics;

pub const MAGIC: &[u8; 6] = b"TsFile";
pub const VERSION: u8 = 3;

/// Describes one chunk: a series' pages for one write epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub device_id: String,
    pub measurement_id: String,
    pub data_type: DataType,
    pub time_encoding: Encoding,
    pub value_encoding: Encoding,
    pub compression: Compression,
    pub num_values: u64,
    pub num_pages: u32,
    pub time_range: TimeRange,
    pub statistics: Statistics,
    /// Declared values of an `ENUMS` series.
    pub enum_values: Option<Vec<String>>,
    /// Offset of the chunk data in the file, assigned by the file writer.
    pub offset: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFooter {
    pub chunks: Vec<ChunkMetadata>,
}

/// Destination of finished chunks.
pub trait ChunkWriter {
    fn write_chunk(&mut self, meta: ChunkMetadata, data: &[u8]) -> Result<()>;
}

/// Writes chunks into a single file.
///
/// File layout: magic, version, chunk data..., bincode footer, footer length
/// (u32 BE), magic.
///
/// A failed write may leave partial bytes behind, so it closes the writer and
/// every later call fails with [`Error::FileWriterClosed`].
pub struct TsFileIoWriter<W: Write> {
    writer: W,
    pos: u64,
    device_id: Option<String>,
    chunks: Vec<ChunkMetadata>,
    closed: bool,
}

impl TsFileIoWriter<BufWriter<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref()).context(IOSnafu)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> TsFileIoWriter<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(MAGIC).context(IOSnafu)?;
        writer.write_all(&[VERSION]).context(IOSnafu)?;
        Ok(Self {
            writer,
            pos: (MAGIC.len() + 1) as u64,
            device_id: None,
            chunks: Vec::new(),
            closed: false,
        })
    }

    /// Chunks written until the next `end_chunk_group` belong to `device_id`.
    pub fn start_chunk_group(&mut self, device_id: impl Into<String>) -> Result<()> {
        if self.closed {
            return Err(Error::FileWriterClosed);
        }
        self.device_id = Some(device_id.into());
        Ok(())
    }

    pub fn end_chunk_group(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::FileWriterClosed);
        }
        self.device_id = None;
        Ok(())
    }

    /// Writes the footer and flushes the underlying writer.
    pub fn end_file(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::FileWriterClosed);
        }
        let buf = bincode::serialize(&FooterRef {
            chunks: &self.chunks,
        })
        .context(SerializeSnafu)?;
        let footer_len = u32::try_from(buf.len()).map_err(|_| Error::OutOfSpec {
            reason: format!("footer of {} bytes is too large", buf.len()),
        })?;

        let mut tail = buf;
        tail.extend_from_slice(&footer_len.to_be_bytes());
        tail.extend_from_slice(MAGIC);
        self.write_all(&tail)?;
        self.closed = true;
        self.writer.flush().context(IOSnafu)?;
        debug!("file closed with {} chunks, {} bytes", self.chunks.len(), self.pos);
        Ok(())
    }

    pub fn chunks(&self) -> &[ChunkMetadata] {
        &self.chunks
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if let Err(e) = self.writer.write_all(buf) {
            self.closed = true;
            return Err(Error::IO { source: e });
        }
        self.pos += buf.len() as u64;
        Ok(())
    }
}

/// Serializes like [`FileFooter`] without taking the chunks.
#[derive(Serialize)]
struct FooterRef<'a> {
    chunks: &'a [ChunkMetadata],
}

impl<W: Write> ChunkWriter for TsFileIoWriter<W> {
    fn write_chunk(&mut self, mut meta: ChunkMetadata, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::FileWriterClosed);
        }
        let device_id = self.device_id.as_ref().ok_or_else(|| Error::OutOfSpec {
            reason: format!(
                "chunk of {} written outside a chunk group",
                meta.measurement_id
            ),
        })?;
        meta.device_id = device_id.clone();
        meta.offset = self.pos;
        meta.size = data.len() as u64;
        self.write_all(data)?;
        self.chunks.push(meta);
        Ok(())
    }
}

/// Reads the footer of a complete file.
pub fn read_footer(file: &[u8]) -> Result<FileFooter> {
    let head_len = MAGIC.len() + 1;
    let tail_len = 4 + MAGIC.len();
    if file.len() < head_len + tail_len
        || &file[..MAGIC.len()] != MAGIC
        || &file[file.len() - MAGIC.len()..] != MAGIC
    {
        return Err(Error::OutOfSpec {
            reason: "not a complete tsfile".to_string(),
        });
    }
    let len_pos = file.len() - tail_len;
    let footer_len = decode_be_u32(&file[len_pos..]).unwrap_or_default() as usize;
    if footer_len > len_pos - head_len {
        return Err(Error::OutOfSpec {
            reason: format!("footer length {} overflows the file", footer_len),
        });
    }
    let footer = bincode::deserialize(&file[len_pos - footer_len..len_pos])
        .context(SerializeSnafu)?;
    Ok(footer)
}

/// Returns the data of `meta` inside `file`.
pub fn chunk_data<'a>(file: &'a [u8], meta: &ChunkMetadata) -> Result<&'a [u8]> {
    let start = meta.offset as usize;
    let end = start + meta.size as usize;
    file.get(start..end).ok_or_else(|| Error::OutOfSpec {
        reason: format!("chunk {}..{} is out of the file", start, end),
    })
}
