use std::collections::HashMap;

use trace::warn;

use crate::errors::{Error, Result};
use crate::field_value::FieldVal;
use crate::value_type::DataType;

/// Property key holding the declared values of an `ENUMS` measurement.
pub const ENUM_VALUES: &str = "enum_values";
pub const ENUM_VALUES_SEPARATOR: &str = ",";

/// A parameter accepted by a data type converter, parsed into its typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterParameter {
    EnumValues(Vec<String>),
}

/// Per data type extra configuration. Only `ENUMS` has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTypeConverter {
    Enums(EnumConverter),
}

impl DataTypeConverter {
    pub fn for_type(data_type: DataType) -> Result<Self> {
        match data_type {
            DataType::Enums => Ok(DataTypeConverter::Enums(EnumConverter::default())),
            _ => {
                warn!("data type {} has no converter", data_type);
                Err(Error::UnsupportedConverter { data_type })
            }
        }
    }

    /// Checks a raw `key = value` schema parameter of `data_type`.
    pub fn check_parameter(
        data_type: DataType,
        key: &str,
        value: &str,
    ) -> Result<ConverterParameter> {
        match data_type {
            DataType::Enums => EnumConverter::check_parameter(key, value),
            _ => Err(Error::MetadataArgs {
                reason: format!("data type {} doesn't need args: {}", data_type, key),
            }),
        }
    }

    pub fn init_from_props(&mut self, props: &HashMap<String, String>) {
        match self {
            DataTypeConverter::Enums(c) => c.init_from_props(props),
        }
    }

    /// Converts a textual value into the physical value written to the page.
    pub fn convert_text(&self, text: &str) -> FieldVal {
        match self {
            DataTypeConverter::Enums(c) => FieldVal::Int32(c.parse_value(text)),
        }
    }

    /// Values recorded in the chunk metadata of a series using this converter.
    pub fn data_values(&self) -> Option<Vec<String>> {
        match self {
            DataTypeConverter::Enums(c) => c.values().map(|v| v.to_vec()),
        }
    }
}

/// Maps enum text to the `Int32` ordinal actually written. Ordinals start at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumConverter {
    values: Option<Vec<String>>,
}

impl EnumConverter {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values: Some(values),
        }
    }

    pub fn values(&self) -> Option<&[String]> {
        self.values.as_deref()
    }

    /// Returns the ordinal of `v`, or -1 for empty input, unknown input, or
    /// when the converter was never initialised.
    pub fn parse_value(&self, v: &str) -> i32 {
        if v.is_empty() {
            warn!("write enum null, String: {}", v);
            return -1;
        }
        let values = match &self.values {
            Some(values) => values,
            None => {
                warn!("EnumConverter is not initialized");
                return -1;
            }
        };
        match values.iter().position(|e| e == v) {
            Some(idx) => idx as i32 + 1,
            None => {
                warn!("unknown enum value: {}", v);
                -1
            }
        }
    }

    /// Reads declared values from `props[ENUM_VALUES]`, written like `["a","b","c"]`.
    pub fn init_from_props(&mut self, props: &HashMap<String, String>) {
        let raw = match props.get(ENUM_VALUES) {
            Some(raw) => raw,
            None => {
                warn!("ENUMS has no data values.");
                return;
            }
        };
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(values) => self.values = Some(values),
            Err(e) => warn!("ENUMS data values {} are not a JSON string array: {}", raw, e),
        }
    }

    pub fn check_parameter(key: &str, value: &str) -> Result<ConverterParameter> {
        if key == ENUM_VALUES {
            Ok(ConverterParameter::EnumValues(
                value
                    .split(ENUM_VALUES_SEPARATOR)
                    .map(|v| v.to_string())
                    .collect(),
            ))
        } else {
            Err(Error::MetadataArgs {
                reason: format!("ENUMS doesn't need args: {}, only {}", key, ENUM_VALUES),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_enum_converter() {
        let mut converter = DataTypeConverter::for_type(DataType::Enums).unwrap();
        let DataTypeConverter::Enums(ref c) = converter;
        assert_eq!(c.parse_value("MAN"), -1);
        assert_eq!(converter.data_values(), None);

        let mut props = HashMap::new();
        props.insert(ENUM_VALUES.to_string(), r#"["MAN","WOMAN"]"#.to_string());
        converter.init_from_props(&props);
        let DataTypeConverter::Enums(ref c) = converter;
        assert_eq!(c.parse_value("MAN"), 1);
        assert_eq!(c.parse_value("WOMAN"), 2);
        assert_eq!(c.parse_value(""), -1);
        assert_eq!(c.parse_value("CHILD"), -1);
        assert_eq!(converter.convert_text("WOMAN"), FieldVal::Int32(2));
        assert_eq!(
            converter.data_values(),
            Some(vec!["MAN".to_string(), "WOMAN".to_string()])
        );
    }

    #[test]
    fn test_enum_values_json() {
        let mut converter = DataTypeConverter::for_type(DataType::Enums).unwrap();
        let mut props = HashMap::new();
        props.insert(ENUM_VALUES.to_string(), r#"["a,b","c \"d\""]"#.to_string());
        converter.init_from_props(&props);
        assert_eq!(
            converter.data_values(),
            Some(vec!["a,b".to_string(), r#"c "d""#.to_string()])
        );
        assert_eq!(converter.convert_text("a,b"), FieldVal::Int32(1));

        let mut converter = DataTypeConverter::for_type(DataType::Enums).unwrap();
        props.insert(ENUM_VALUES.to_string(), "[a, b".to_string());
        converter.init_from_props(&props);
        assert_eq!(converter.data_values(), None);
    }

    #[test]
    fn test_missing_props() {
        let mut converter = DataTypeConverter::for_type(DataType::Enums).unwrap();
        converter.init_from_props(&HashMap::new());
        assert_eq!(converter.data_values(), None);
        assert!(DataTypeConverter::for_type(DataType::Int32).is_err());
    }

    #[test]
    fn test_check_parameter() {
        let p = DataTypeConverter::check_parameter(DataType::Enums, ENUM_VALUES, "a,b").unwrap();
        assert_eq!(
            p,
            ConverterParameter::EnumValues(vec!["a".to_string(), "b".to_string()])
        );
        assert!(matches!(
            DataTypeConverter::check_parameter(DataType::Enums, "max_point_number", "2"),
            Err(Error::MetadataArgs { .. })
        ));
        assert!(matches!(
            DataTypeConverter::check_parameter(DataType::Double, ENUM_VALUES, "a"),
            Err(Error::MetadataArgs { .. })
        ));
    }
}
