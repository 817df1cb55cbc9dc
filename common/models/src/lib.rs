pub mod codec;
pub mod decimal;
pub mod errors;
pub mod field_value;
pub mod schema;
pub mod time_range;
pub mod value_type;

pub use decimal::Decimal;
pub use errors::{Error, Result};
pub use field_value::FieldVal;
pub use time_range::TimeRange;
pub use value_type::DataType;

pub type Timestamp = i64;
