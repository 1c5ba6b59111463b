//! src/keywords.rs
use crate::job_conf::JobConf;
use anyhow::Context;
use std::collections::BTreeSet;

pub const ARGC_KEY: &str = "argc";

pub fn keyword_key(index: usize) -> String {
    format!("keyword{index}")
}

/// The fixed set of terms a job indexes. Built once by the driver and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: BTreeSet<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.keywords.contains(token)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Stores the set as `argc` plus `keyword0..argc`.
    pub fn write_to(&self, conf: &mut JobConf) {
        conf.set(ARGC_KEY, self.len().to_string());
        for (i, keyword) in self.iter().enumerate() {
            conf.set(keyword_key(i), keyword);
        }
    }

    pub fn from_conf(conf: &JobConf) -> anyhow::Result<Self> {
        let argc: usize = conf
            .get_parsed(ARGC_KEY)
            .context("Failed to read keyword count")?;
        let mut keywords = BTreeSet::new();
        for i in 0..argc {
            let key = keyword_key(i);
            let keyword = conf
                .get(&key)
                .with_context(|| format!("Missing `{key}` for {argc} configured keyword(s)"))?;
            keywords.insert(keyword.to_string());
        }
        Ok(Self { keywords })
    }
}
