//! src/reducers/mod.rs
mod count_and_rank;

pub use count_and_rank::{count_occurrences, CountAndRank, RankedResult};

pub const COUNT_AND_RANK: &str = "count_and_rank";
