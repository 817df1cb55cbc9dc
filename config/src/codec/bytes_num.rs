use serde::{Deserialize, Deserializer, Serializer};
use utils::byte_nums::TsByteNumber;

pub fn serialize<S>(num: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = TsByteNumber::format_bytes_num(*num);

    serializer.serialize_str(&s)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrText {
        Num(u64),
        Text(String),
    }

    match NumOrText::deserialize(deserializer)? {
        NumOrText::Num(n) => Ok(n),
        NumOrText::Text(s) => {
            TsByteNumber::parse_bytes_num(&s).map_err(serde::de::Error::custom)
        }
    }
}
