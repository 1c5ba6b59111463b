//! src/lib.rs
pub mod configuration;
pub mod emitter;
pub mod error;
pub mod file_splitter;
pub mod functions;
pub mod job;
pub mod job_conf;
pub mod keywords;
pub mod mappers;
pub mod mapreduce;
pub mod master;
pub mod output;
pub mod reducers;
pub mod registry;
pub mod spec;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod worker;
