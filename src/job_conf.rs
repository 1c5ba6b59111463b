//! src/job_conf.rs
use anyhow::Context;
use std::collections::BTreeMap;
use std::str::FromStr;

/// String key/value pairs shipped with a job to every task.
///
/// Task functions are configured from this map when the substrate builds
/// them, so anything a mapper or reducer needs must be representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobConf {
    entries: BTreeMap<String, String>,
}

impl JobConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_parsed<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self
            .get(key)
            .with_context(|| format!("Missing job configuration key `{key}`"))?;
        raw.parse::<T>()
            .with_context(|| format!("Invalid value `{raw}` for job configuration key `{key}`"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
