use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::codec::{Compression, Encoding};
use crate::errors::Result;
use crate::schema::converter::DataTypeConverter;
use crate::value_type::DataType;

/// Describes how one measurement is written: its type, encoders and page compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementDescriptor {
    measurement_id: String,
    data_type: DataType,
    time_encoding: Encoding,
    value_encoding: Encoding,
    compression: Compression,
    converter: Option<DataTypeConverter>,
    props: HashMap<String, String>,
}

impl MeasurementDescriptor {
    /// Creates a descriptor; `Encoding::Default` is resolved for `data_type`.
    pub fn new(
        measurement_id: impl Into<String>,
        data_type: DataType,
        value_encoding: Encoding,
    ) -> Result<Self> {
        let value_encoding = value_encoding.check_value_encoding(data_type)?;
        let converter = match data_type {
            DataType::Enums => Some(DataTypeConverter::for_type(data_type)?),
            _ => None,
        };
        Ok(Self {
            measurement_id: measurement_id.into(),
            data_type,
            time_encoding: Encoding::Default.resolve_for_time(),
            value_encoding,
            compression: Compression::default(),
            converter,
            props: HashMap::new(),
        })
    }

    pub fn with_time_encoding(mut self, time_encoding: Encoding) -> Result<Self> {
        self.time_encoding = time_encoding.check_time_encoding()?;
        Ok(self)
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Attaches schema properties; converters read their parameters from them.
    pub fn with_props(mut self, props: HashMap<String, String>) -> Self {
        if let Some(converter) = self.converter.as_mut() {
            converter.init_from_props(&props);
        }
        self.props = props;
        self
    }

    pub fn measurement_id(&self) -> &str {
        &self.measurement_id
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn time_encoding(&self) -> Encoding {
        self.time_encoding
    }

    pub fn value_encoding(&self) -> Encoding {
        self.value_encoding
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn converter(&self) -> Option<&DataTypeConverter> {
        self.converter.as_ref()
    }

    pub fn props(&self) -> &HashMap<String, String> {
        &self.props
    }
}

impl Display for MeasurementDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}]",
            self.measurement_id,
            self.data_type,
            self.time_encoding,
            self.value_encoding,
            self.compression
        )
    }
}
