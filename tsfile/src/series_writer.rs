//! Buffers the points of one series, cuts them into pages and seals the pages
//! of a write epoch into a chunk.
//!
//! Measuring the encoded size of a page is not free, so it is only probed when
//! the point count reaches `next_check_threshold`. After a probe that does not
//! flush, the threshold is extrapolated from the observed bytes per point to
//! the count at which `page_size_threshold` would be crossed.

use config::TsFileConfig;
use models::codec::{Compression, Encoding};
use models::schema::MeasurementDescriptor;
use models::{DataType, FieldVal};
use trace::{debug, error};

use crate::error::{Error, Result};
use crate::file_writer::ChunkWriter;
use crate::page::PageSink;
use crate::statistics::Statistics;
use crate::value_writer::ValueWriter;

/// Point count of a fresh page at which the first size probe happens.
pub const MINIMUM_RECORD_COUNT_FOR_CHECK: usize = 1;

/// How the writer treats timestamps that are not after the last written one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeOrderPolicy {
    /// Accepted as is; ordering is up to the caller.
    #[default]
    Unchecked,
    /// Rejected with [`Error::OutOfOrder`] before anything is buffered.
    Strict,
}

pub struct SeriesWriter<P: PageSink> {
    device_id: String,
    desc: MeasurementDescriptor,
    data_type: DataType,

    value_writer: ValueWriter,
    page_sink: P,

    page_value_count: usize,
    next_check_threshold: usize,
    page_statistics: Statistics,
    series_statistics: Statistics,
    last_time: Option<i64>,
    page_min_time: Option<i64>,

    max_points_per_page: usize,
    page_size_threshold: u64,
    time_order: TimeOrderPolicy,
}

impl<P: PageSink> SeriesWriter<P> {
    pub fn new(
        device_id: impl Into<String>,
        desc: MeasurementDescriptor,
        page_sink: P,
        page_size_threshold: u64,
    ) -> Self {
        let data_type = desc.data_type();
        Self {
            device_id: device_id.into(),
            value_writer: ValueWriter::new(&desc),
            desc,
            data_type,
            page_sink,
            page_value_count: 0,
            next_check_threshold: MINIMUM_RECORD_COUNT_FOR_CHECK,
            page_statistics: Statistics::new(data_type),
            series_statistics: Statistics::new(data_type),
            last_time: None,
            page_min_time: None,
            max_points_per_page: TsFileConfig::default_max_points_per_page(),
            page_size_threshold,
            time_order: TimeOrderPolicy::default(),
        }
    }

    pub fn with_config(
        device_id: impl Into<String>,
        desc: MeasurementDescriptor,
        page_sink: P,
        config: &TsFileConfig,
    ) -> Self {
        let time_order = if config.strict_time_order {
            TimeOrderPolicy::Strict
        } else {
            TimeOrderPolicy::Unchecked
        };
        Self::new(device_id, desc, page_sink, config.page_size_threshold)
            .with_max_points_per_page(config.max_points_per_page)
            .with_time_order(time_order)
    }

    pub fn with_max_points_per_page(mut self, max_points_per_page: usize) -> Self {
        self.max_points_per_page = max_points_per_page.max(1);
        self
    }

    pub fn with_time_order(mut self, time_order: TimeOrderPolicy) -> Self {
        self.time_order = time_order;
        self
    }

    /// Replaces the value buffer, e.g. to plug in custom encoders.
    pub fn with_value_writer(mut self, value_writer: ValueWriter) -> Self {
        self.value_writer = value_writer;
        self
    }

    /// Buffers one point and flushes the page when it is full.
    ///
    /// Type and ordering errors are returned before any state changes. A page
    /// that fails to flush is dropped and logged; the write still succeeds.
    pub fn write(&mut self, time: i64, value: &FieldVal) -> Result<()> {
        value.check_type(self.data_type)?;
        if let (TimeOrderPolicy::Strict, Some(last_time)) = (self.time_order, self.last_time) {
            if time <= last_time {
                return Err(Error::OutOfOrder { time, last_time });
            }
        }

        self.value_writer.write(time, value)?;
        self.page_statistics.update(value)?;
        self.last_time = Some(time);
        self.page_value_count += 1;
        if self.page_min_time.is_none() {
            self.page_min_time = Some(time);
        }
        self.check_page_size_and_may_open_new_page();
        Ok(())
    }

    /// Writes the text of an `ENUMS` value through the descriptor's converter.
    pub fn write_text(&mut self, time: i64, text: &str) -> Result<()> {
        let value = match self.desc.converter() {
            Some(converter) => converter.convert_text(text),
            None => {
                return Err(Error::Model {
                    source: models::Error::UnsupportedConverter {
                        data_type: self.data_type,
                    },
                })
            }
        };
        self.write(time, &value)
    }

    fn check_page_size_and_may_open_new_page(&mut self) {
        if self.page_value_count >= self.max_points_per_page {
            debug!(
                "{}.{}: current line count reaches the upper bound {}, write page",
                self.device_id,
                self.desc.measurement_id(),
                self.max_points_per_page
            );
            self.write_page_and_log();
        } else if self.page_value_count >= self.next_check_threshold {
            let current_page_size = self.value_writer.estimate_max_mem_size() as u64;
            if current_page_size > self.page_size_threshold {
                debug!(
                    "{}.{}: enough size {} > {} with {} points, write page",
                    self.device_id,
                    self.desc.measurement_id(),
                    current_page_size,
                    self.page_size_threshold,
                    self.page_value_count
                );
                self.write_page_and_log();
            } else if current_page_size == 0 {
                self.next_check_threshold = self.page_value_count + 1;
            } else {
                self.next_check_threshold = ((self.page_size_threshold as f64
                    / current_page_size as f64)
                    * self.page_value_count as f64)
                    as usize;
                debug!(
                    "{}.{}: not enough size {} <= {} with {} points, next check at {}",
                    self.device_id,
                    self.desc.measurement_id(),
                    current_page_size,
                    self.page_size_threshold,
                    self.page_value_count,
                    self.next_check_threshold
                );
            }
        }
    }

    fn write_page_and_log(&mut self) {
        let page_value_count = self.page_value_count;
        if let Err(e) = self.flush_page() {
            error!(
                "{}.{}: dropped a page of {} points: {}",
                self.device_id,
                self.desc.measurement_id(),
                page_value_count,
                e
            );
        }
    }

    /// Hands the buffered points to the page sink as one page.
    ///
    /// The page state is reset whatever the outcome, so a failed page is lost.
    /// Series statistics only absorb pages the sink accepted.
    pub fn flush_page(&mut self) -> Result<()> {
        let result = self.write_page_to_sink();
        self.reset_page_states();
        result
    }

    fn write_page_to_sink(&mut self) -> Result<()> {
        if self.page_value_count == 0 {
            return Ok(());
        }
        let (min_time, max_time) = match (self.page_min_time, self.last_time) {
            (Some(min_time), Some(max_time)) => (min_time, max_time),
            _ => {
                return Err(Error::Page {
                    reason: "buffered points have no time bounds".to_string(),
                })
            }
        };
        let bytes = self.value_writer.get_bytes()?;
        self.page_sink.write_page(
            bytes,
            self.page_value_count,
            &self.page_statistics,
            max_time,
            min_time,
        )?;
        self.series_statistics.merge(&self.page_statistics)
    }

    fn reset_page_states(&mut self) {
        self.page_min_time = None;
        self.page_value_count = 0;
        self.next_check_threshold = MINIMUM_RECORD_COUNT_FOR_CHECK;
        self.value_writer.reset();
        self.page_statistics = Statistics::new(self.data_type);
    }

    /// Flushes the buffered page, then emits every page of this write epoch
    /// into `file_writer` as one chunk.
    ///
    /// On error the page sink and series statistics are kept so the caller can
    /// retry. Each successful call emits one chunk, even an empty one.
    pub fn seal(&mut self, file_writer: &mut dyn ChunkWriter) -> Result<()> {
        if self.page_value_count > 0 {
            self.write_page_and_log();
        }
        self.page_sink
            .write_to_file_writer(file_writer, &self.series_statistics)?;
        debug!(
            "{}.{}: sealed chunk of {} points",
            self.device_id,
            self.desc.measurement_id(),
            self.series_statistics.count()
        );
        self.page_sink.reset();
        self.series_statistics = Statistics::new(self.data_type);
        Ok(())
    }

    /// Memory held by the buffered page plus the pages waiting in the sink.
    pub fn estimate_max_series_mem_size(&self) -> usize {
        self.value_writer.estimate_max_mem_size() + self.page_sink.estimate_max_page_mem_size()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn descriptor(&self) -> &MeasurementDescriptor {
        &self.desc
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn page_value_count(&self) -> usize {
        self.page_value_count
    }

    pub fn page_min_time(&self) -> Option<i64> {
        self.page_min_time
    }

    pub fn last_time(&self) -> Option<i64> {
        self.last_time
    }

    pub fn next_check_threshold(&self) -> usize {
        self.next_check_threshold
    }

    pub fn page_statistics(&self) -> &Statistics {
        &self.page_statistics
    }

    pub fn series_statistics(&self) -> &Statistics {
        &self.series_statistics
    }

    pub fn max_points_per_page(&self) -> usize {
        self.max_points_per_page
    }

    pub fn page_size_threshold(&self) -> u64 {
        self.page_size_threshold
    }

    pub fn page_sink(&self) -> &P {
        &self.page_sink
    }

    pub fn page_sink_mut(&mut self) -> &mut P {
        &mut self.page_sink
    }
}

/// Applies the configured time encoding and page compression to `desc`.
pub fn configure_descriptor(
    desc: MeasurementDescriptor,
    config: &TsFileConfig,
) -> Result<MeasurementDescriptor> {
    let time_encoding = Encoding::from(models::codec::codec_name_to_codec(&config.time_encoding));
    let compression = Compression::parse(&config.compressor)?;
    Ok(desc
        .with_time_encoding(time_encoding)?
        .with_compression(compression))
}
