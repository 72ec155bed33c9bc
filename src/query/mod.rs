pub mod parser;
pub mod types;

pub use parser::{QueryParseError, parse_query};
pub use types::{MetricQuery, TimeRange, ValidatedQuery};

#[cfg(test)]
mod parser_test;
