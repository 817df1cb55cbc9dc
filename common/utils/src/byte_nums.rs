use byte_unit::{Byte, ParseError, UnitType};

pub struct TsByteNumber {
    byte: Byte,
}

impl TsByteNumber {
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_bytes_num(text).ok().map(|num| TsByteNumber {
            byte: Byte::from_u64(num),
        })
    }

    pub fn as_bytes_num(&self) -> u64 {
        self.byte.as_u64()
    }

    pub fn format_bytes_num(bytes: u64) -> String {
        Byte::from_u64(bytes)
            .get_appropriate_unit(UnitType::Both)
            .to_string()
    }

    /// Parses a string (with byte unit e.g. 'k', 'MiB', 'GB') into a `u64` number of bytes.
    /// Underscores are ignored, so `"1_048_576"` is accepted.
    pub fn parse_bytes_num(s: &str) -> Result<u64, ParseError> {
        let s = s.chars().filter(|c| *c != '_').collect::<String>();
        Byte::parse_str(&s, true).map(|byte| byte.as_u64())
    }
}
