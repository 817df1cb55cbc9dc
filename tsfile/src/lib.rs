pub use error::{Error, Result};
pub use file_writer::{ChunkMetadata, ChunkWriter, FileFooter, TsFileIoWriter};
pub use page::{PageHeader, PageSink, PageWriter};
pub use series_writer::{SeriesWriter, TimeOrderPolicy};
pub use statistics::Statistics;
pub use value_writer::ValueWriter;

pub mod byte_utils;
pub mod codec;
pub mod error;
pub mod file_writer;
pub mod page;
pub mod series_writer;
pub mod statistics;
pub mod value_writer;
