//! Rule construction and evaluation
//!
//! Rules are built from condition strings like "age > 30 AND department = 'Sales'"
//! or from a structured JSON description, combined under AND/OR, and
//! evaluated against a DataRecord.

mod ast;
pub mod combine;
mod evaluator;
pub mod parser;
mod record;
pub mod structured;


pub use ast::*;
pub use combine::*;
pub use evaluator::*;
pub use parser::*;
pub use record::*;
pub use structured::*;
