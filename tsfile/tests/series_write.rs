#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use models::codec::{Compression, Encoding};
    use models::schema::{MeasurementDescriptor, ENUM_VALUES};
    use models::{DataType, Decimal, FieldVal};
    use serial_test::serial;
    use trace::{info, init_default_global_tracing};
    use tsfile::codec::{get_time_encoder, CodecError, ValueEncoder};
    use tsfile::file_writer::{chunk_data, read_footer, ChunkMetadata};
    use tsfile::page::decode_chunk;
    use tsfile::{
        ChunkWriter, Error, PageSink, PageWriter, Result, SeriesWriter, Statistics,
        TimeOrderPolicy, TsFileIoWriter, ValueWriter,
    };

    fn init_tracing() {
        let dir = std::env::temp_dir().join("tsfile_test_logs");
        init_default_global_tracing(dir, "tsfile_test.log", "debug");
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SinkCall {
        Page {
            value_count: usize,
            statistics: Statistics,
            max_time: i64,
            min_time: i64,
        },
        Finalize {
            series_statistics: Statistics,
        },
    }

    /// Records every call; clones share the record.
    #[derive(Debug, Clone, Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<SinkCall>>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }

        fn page_calls(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, SinkCall::Page { .. }))
                .count()
        }
    }

    impl PageSink for RecordingSink {
        fn write_page(
            &mut self,
            _bytes: Bytes,
            value_count: usize,
            statistics: &Statistics,
            max_time: i64,
            min_time: i64,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(SinkCall::Page {
                value_count,
                statistics: statistics.clone(),
                max_time,
                min_time,
            });
            Ok(())
        }

        fn estimate_max_page_mem_size(&self) -> usize {
            0
        }

        fn write_to_file_writer(
            &mut self,
            _file_writer: &mut dyn ChunkWriter,
            series_statistics: &Statistics,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(SinkCall::Finalize {
                series_statistics: series_statistics.clone(),
            });
            Ok(())
        }

        fn reset(&mut self) {}
    }

    fn descriptor(data_type: DataType) -> MeasurementDescriptor {
        MeasurementDescriptor::new("s1", data_type, Encoding::Default).unwrap()
    }

    fn double_stats(values: &[f64]) -> Statistics {
        let mut stats = Statistics::new(DataType::Double);
        for v in values {
            stats.update(&FieldVal::Double(*v)).unwrap();
        }
        stats
    }

    #[test]
    #[serial]
    fn test_three_point_pages() {
        init_tracing();
        let sink = RecordingSink::default();
        let mut writer = SeriesWriter::new(
            "root.d1",
            descriptor(DataType::Double),
            sink.clone(),
            u64::MAX,
        )
        .with_max_points_per_page(3);

        for t in 1..=3 {
            writer.write(t, &FieldVal::Double(t as f64)).unwrap();
        }
        assert_eq!(
            sink.calls(),
            vec![SinkCall::Page {
                value_count: 3,
                statistics: double_stats(&[1.0, 2.0, 3.0]),
                max_time: 3,
                min_time: 1,
            }]
        );

        writer.write(4, &FieldVal::Double(4.0)).unwrap();
        writer.seal(&mut TsFileIoWriter::new(Vec::new()).unwrap()).unwrap();

        let calls = sink.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            SinkCall::Page {
                value_count: 1,
                statistics: double_stats(&[4.0]),
                max_time: 4,
                min_time: 4,
            }
        );
        match &calls[2] {
            SinkCall::Finalize { series_statistics } => {
                assert_eq!(series_statistics.min_value(), Some(FieldVal::Double(1.0)));
                assert_eq!(series_statistics.max_value(), Some(FieldVal::Double(4.0)));
                assert_eq!(series_statistics.count(), 4);
            }
            other => panic!("expected finalize, got {:?}", other),
        }
    }

    #[test]
    fn test_count_invariant() {
        let sink = RecordingSink::default();
        let mut writer =
            SeriesWriter::new("root.d1", descriptor(DataType::Int64), sink.clone(), u64::MAX)
                .with_max_points_per_page(10);
        for i in 0..25_i64 {
            writer.write(i, &FieldVal::Int64(i)).unwrap();
            assert_eq!(writer.page_value_count(), (i as usize + 1) % 10);
            match writer.page_value_count() {
                0 => assert_eq!(writer.page_min_time(), None),
                n => assert_eq!(writer.page_min_time(), Some(i + 1 - n as i64)),
            }
        }
        assert_eq!(sink.page_calls(), 2);
    }

    #[test]
    fn test_statistics_fold_over_pages() {
        let sink = RecordingSink::default();
        let mut writer = SeriesWriter::new(
            "root.d1",
            descriptor(DataType::Int32),
            sink.clone(),
            u64::MAX,
        )
        .with_max_points_per_page(2);
        for (t, v) in [1, 5, 3, 9, 2].into_iter().enumerate() {
            writer.write(t as i64, &FieldVal::Int32(v)).unwrap();
        }
        writer.seal(&mut TsFileIoWriter::new(Vec::new()).unwrap()).unwrap();

        let calls = sink.calls();
        assert_eq!(sink.page_calls(), 3);
        match calls.last() {
            Some(SinkCall::Finalize { series_statistics }) => {
                assert_eq!(series_statistics.min_value(), Some(FieldVal::Int32(1)));
                assert_eq!(series_statistics.max_value(), Some(FieldVal::Int32(9)));
                assert_eq!(series_statistics.count(), 5);
                assert_eq!(series_statistics.sum(), Some(20.0));
            }
            other => panic!("expected finalize, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_seal_finalizes_without_page() {
        let sink = RecordingSink::default();
        let mut writer =
            SeriesWriter::new("root.d1", descriptor(DataType::Boolean), sink.clone(), 1024);
        let mut file_writer = TsFileIoWriter::new(Vec::new()).unwrap();
        writer.seal(&mut file_writer).unwrap();
        writer.seal(&mut file_writer).unwrap();
        assert_eq!(sink.page_calls(), 0);
        assert_eq!(sink.calls().len(), 2);
    }

    /// Plain time and value columns cost 16 bytes per point on top of 12 bytes
    /// of block headers.
    #[test]
    fn test_size_flush_converges() {
        let threshold = 1000_u64;
        let desc = MeasurementDescriptor::new("s1", DataType::Double, Encoding::Plain)
            .unwrap()
            .with_time_encoding(Encoding::Plain)
            .unwrap();
        let sink = PageWriter::new(desc.clone());
        let mut writer = SeriesWriter::new("root.d1", desc, sink, threshold);
        for t in 0..500 {
            writer.write(t, &FieldVal::Double(t as f64)).unwrap();
        }
        let estimate = |n: u64| 12 + 16 * n;

        let pages = decode_chunk(
            writer.page_sink().chunk_buffer(),
            DataType::Double,
            Compression::Uncompressed,
        )
        .unwrap();
        assert!(pages.len() >= 7);
        let mut next_time = 0;
        for page in pages.iter() {
            let n = page.header.num_values as u64;
            assert!(estimate(n) > threshold);
            assert!(estimate(n - 1) <= threshold);
            assert_eq!(page.times[0], next_time);
            next_time += n as i64;
        }
        assert_eq!(
            next_time + writer.page_value_count() as i64,
            500,
            "points lost or duplicated across pages"
        );
    }

    #[derive(Debug, Default)]
    struct CorruptEncoder {
        count: usize,
    }

    impl ValueEncoder for CorruptEncoder {
        fn encoding(&self) -> Encoding {
            Encoding::Plain
        }

        fn encode(&mut self, _value: &FieldVal) -> std::result::Result<(), CodecError> {
            self.count += 1;
            Ok(())
        }

        fn max_byte_size(&self) -> usize {
            self.count
        }

        fn flush(&self, _dst: &mut Vec<u8>) -> std::result::Result<(), CodecError> {
            Err("corrupted encoder state".into())
        }

        fn reset(&mut self) {
            self.count = 0;
        }
    }

    #[test]
    #[serial]
    fn test_encoding_error_drops_page() {
        init_tracing();
        let sink = RecordingSink::default();
        let value_writer = ValueWriter::with_encoders(
            DataType::Int64,
            get_time_encoder(Encoding::Delta),
            Box::<CorruptEncoder>::default(),
        );
        let mut writer = SeriesWriter::new(
            "root.d1",
            descriptor(DataType::Int64),
            sink.clone(),
            u64::MAX,
        )
        .with_max_points_per_page(2)
        .with_value_writer(value_writer);

        writer.write(1, &FieldVal::Int64(1)).unwrap();
        writer.write(2, &FieldVal::Int64(2)).unwrap();
        assert_eq!(sink.page_calls(), 0);
        assert_eq!(writer.page_value_count(), 0);
        assert_eq!(writer.page_min_time(), None);
        assert!(writer.series_statistics().is_empty());

        writer.write(3, &FieldVal::Int64(3)).unwrap();
        assert_eq!(writer.page_min_time(), Some(3));
        assert!(matches!(writer.flush_page(), Err(Error::Encoding { .. })));
        assert_eq!(writer.page_value_count(), 0);
    }

    #[test]
    #[serial]
    fn test_rejected_page_keeps_ingesting() {
        init_tracing();
        let desc = descriptor(DataType::Int64);
        let sink = PageWriter::new(desc.clone()).with_max_chunk_size(150);
        let mut writer =
            SeriesWriter::new("root.d1", desc, sink, u64::MAX).with_max_points_per_page(4);

        for t in 0..40 {
            writer.write(t, &FieldVal::Int64(t * 7)).unwrap();
        }
        let accepted = writer.page_sink().num_values();
        assert!(accepted > 0);
        assert!(accepted < 40);
        assert_eq!(writer.series_statistics().count(), accepted);
        assert_eq!(writer.page_value_count(), 0);
    }

    #[test]
    fn test_strict_order_from_config() {
        let mut config = config::TsFileConfig::default();
        config.strict_time_order = true;
        let mut writer = SeriesWriter::with_config(
            "root.d1",
            descriptor(DataType::Float),
            RecordingSink::default(),
            &config,
        );
        writer.write(10, &FieldVal::Float(1.0)).unwrap();
        assert!(matches!(
            writer.write(10, &FieldVal::Float(1.0)),
            Err(Error::OutOfOrder { .. })
        ));
        assert_eq!(writer.page_value_count(), 1);

        let writer = writer.with_time_order(TimeOrderPolicy::Unchecked);
        assert_eq!(writer.last_time(), Some(10));
    }

    #[test]
    fn test_estimate_series_mem_size() {
        let desc = descriptor(DataType::Binary);
        let sink = PageWriter::new(desc.clone());
        let mut writer =
            SeriesWriter::new("root.d1", desc, sink, u64::MAX).with_max_points_per_page(5);
        assert_eq!(writer.estimate_max_series_mem_size(), 0);
        for t in 0..7 {
            writer.write(t, &FieldVal::from("some text")).unwrap();
        }
        let buffered = writer.page_sink().chunk_buffer().len();
        assert!(buffered > 0);
        assert!(writer.estimate_max_series_mem_size() > buffered);

        let mut file_writer = TsFileIoWriter::new(Vec::new()).unwrap();
        file_writer.start_chunk_group("root.d1").unwrap();
        writer.seal(&mut file_writer).unwrap();
        assert_eq!(writer.estimate_max_series_mem_size(), 0);
        assert_eq!(file_writer.chunks()[0].num_values, 7);
    }

    #[test]
    #[serial]
    fn test_file_round_trip() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.tsfile");
        let mut file_writer = TsFileIoWriter::open(&path).unwrap();

        let temperature =
            MeasurementDescriptor::new("temperature", DataType::Double, Encoding::Gorilla)
                .unwrap()
                .with_compression(Compression::Snappy);
        let price = descriptor(DataType::Decimal);
        let gender = descriptor(DataType::Enums).with_props(
            [(ENUM_VALUES.to_string(), "[\"MAN\",\"WOMAN\"]".to_string())]
                .into_iter()
                .collect(),
        );

        let mut temperature_writer = SeriesWriter::new(
            "root.sg.d1",
            temperature.clone(),
            PageWriter::new(temperature),
            256,
        );
        let mut price_writer =
            SeriesWriter::new("root.sg.d1", price.clone(), PageWriter::new(price), 1024)
                .with_max_points_per_page(16);
        let mut gender_writer =
            SeriesWriter::new("root.sg.d1", gender.clone(), PageWriter::new(gender), 1024);

        for t in 0..100_i64 {
            temperature_writer
                .write(t * 1000, &FieldVal::Double(20.0 + (t % 7) as f64 * 0.5))
                .unwrap();
            price_writer
                .write(t * 1000, &FieldVal::Decimal(Decimal::new(t as i128 * 25, 2).unwrap()))
                .unwrap();
            gender_writer
                .write_text(t * 1000, if t % 3 == 0 { "WOMAN" } else { "MAN" })
                .unwrap();
        }

        file_writer.start_chunk_group("root.sg.d1").unwrap();
        temperature_writer.seal(&mut file_writer).unwrap();
        price_writer.seal(&mut file_writer).unwrap();
        gender_writer.seal(&mut file_writer).unwrap();
        file_writer.end_chunk_group().unwrap();
        file_writer.end_file().unwrap();
        assert!(matches!(
            file_writer.start_chunk_group("root.sg.d2"),
            Err(Error::FileWriterClosed)
        ));
        drop(file_writer);

        let file = std::fs::read(&path).unwrap();
        let footer = read_footer(&file).unwrap();
        assert_eq!(footer.chunks.len(), 3);
        info!("read {} chunks from {}", footer.chunks.len(), path.display());

        let read_chunk = |meta: &ChunkMetadata| {
            let data = chunk_data(&file, meta).unwrap();
            let pages = decode_chunk(data, meta.data_type, meta.compression).unwrap();
            assert_eq!(pages.len() as u32, meta.num_pages);
            let mut times = Vec::new();
            let mut values = Vec::new();
            for page in pages {
                times.extend(page.times);
                values.extend(page.values);
            }
            (times, values)
        };

        let meta = &footer.chunks[0];
        assert_eq!(meta.device_id, "root.sg.d1");
        assert_eq!(meta.measurement_id, "temperature");
        assert_eq!(meta.num_values, 100);
        assert!(meta.num_pages > 1);
        assert_eq!(meta.time_range.min_ts, 0);
        assert_eq!(meta.time_range.max_ts, 99_000);
        assert_eq!(meta.statistics.max_value(), Some(FieldVal::Double(23.0)));
        let (times, values) = read_chunk(meta);
        assert_eq!(times, (0..100).map(|t| t * 1000).collect::<Vec<_>>());
        assert_eq!(values[10], FieldVal::Double(21.5));

        let meta = &footer.chunks[1];
        assert_eq!(meta.num_pages, 7);
        assert_eq!(meta.statistics.count(), 100);
        assert_eq!(
            meta.statistics.max_value(),
            Some(FieldVal::Decimal(Decimal::new(2475, 2).unwrap()))
        );
        let (_, values) = read_chunk(meta);
        assert_eq!(values[4], FieldVal::Decimal(Decimal::new(100, 2).unwrap()));

        let meta = &footer.chunks[2];
        assert_eq!(meta.data_type, DataType::Enums);
        assert_eq!(
            meta.enum_values,
            Some(vec!["MAN".to_string(), "WOMAN".to_string()])
        );
        let (_, values) = read_chunk(meta);
        assert_eq!(values[0], FieldVal::Int32(2));
        assert_eq!(values[1], FieldVal::Int32(1));
    }
}
