mod converter;
mod measurement;

pub use converter::*;
pub use measurement::*;
