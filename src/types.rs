//! Typed value model.
//!
//! This module provides:
//!
//! - **DataType**: SQL types with their promotion ranking and default metadata
//! - **Value**: Tagged runtime values with SQL literal rendering
//! - Conversion between types (`Value::convert_to`)
//! - Arithmetic on same-typed values (`Value::add` and friends)

mod arithmetic;
mod convert;
pub mod data_type;
pub mod value;

pub use data_type::DataType;
pub use value::{saturating_i32, Value};
