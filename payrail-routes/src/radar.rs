//! `/v1/radar/*`: fraud screening.

pub mod value_lists;
