//! src/registry.rs
use crate::functions::{Mapper, Reducer};
use crate::job_conf::JobConf;
use crate::mappers::{KeywordFilter, KEYWORD_FILTER};
use crate::reducers::{CountAndRank, COUNT_AND_RANK};
use anyhow::Context;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type MapperFactory = Arc<dyn Fn(&JobConf) -> anyhow::Result<Box<dyn Mapper>> + Send + Sync>;
pub type ReducerFactory = Arc<dyn Fn(&JobConf) -> anyhow::Result<Box<dyn Reducer>> + Send + Sync>;

/// Named map and reduce functions available to jobs.
///
/// A job refers to its functions by name; every task attempt gets a fresh
/// instance built from the job configuration.
#[derive(Clone, Default)]
pub struct Registry {
    mappers: BTreeMap<String, MapperFactory>,
    reducers: BTreeMap<String, ReducerFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the keyword filter and the count-and-rank reducer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_mapper(KEYWORD_FILTER, |conf| {
            Ok(Box::new(KeywordFilter::from_conf(conf)?) as Box<dyn Mapper>)
        });
        registry.register_reducer(COUNT_AND_RANK, |_| {
            Ok(Box::new(CountAndRank) as Box<dyn Reducer>)
        });
        registry
    }

    pub fn register_mapper<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&JobConf) -> anyhow::Result<Box<dyn Mapper>> + Send + Sync + 'static,
    {
        self.mappers.insert(name.to_string(), Arc::new(factory));
    }

    pub fn register_reducer<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&JobConf) -> anyhow::Result<Box<dyn Reducer>> + Send + Sync + 'static,
    {
        self.reducers.insert(name.to_string(), Arc::new(factory));
    }

    pub fn mapper(&self, name: &str, conf: &JobConf) -> anyhow::Result<Box<dyn Mapper>> {
        let factory = self
            .mappers
            .get(name)
            .with_context(|| format!("Mapper '{name}' not found"))?;
        factory(conf).with_context(|| format!("Failed to build mapper '{name}'"))
    }

    pub fn reducer(&self, name: &str, conf: &JobConf) -> anyhow::Result<Box<dyn Reducer>> {
        let factory = self
            .reducers
            .get(name)
            .with_context(|| format!("Reducer '{name}' not found"))?;
        factory(conf).with_context(|| format!("Failed to build reducer '{name}'"))
    }

    pub fn mapper_names(&self) -> Vec<&str> {
        self.mappers.keys().map(String::as_str).collect()
    }

    pub fn reducer_names(&self) -> Vec<&str> {
        self.reducers.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("mappers", &self.mapper_names())
            .field("reducers", &self.reducer_names())
            .finish()
    }
}
