//! src/mappers/mod.rs
mod keyword_filter;

pub use keyword_filter::{tokenize, KeywordFilter};

pub const KEYWORD_FILTER: &str = "keyword_filter";
