//! src/reducers/count_and_rank.rs
use crate::functions::{ReduceEmitter, Reducer, Value};
use anyhow::Context;
use std::collections::HashMap;
use std::fmt;

/// Tallies how many times each document appears in a term's group.
pub fn count_occurrences<I, S>(documents: I) -> HashMap<String, u64>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts = HashMap::new();
    for document in documents {
        *counts.entry(document.into()).or_insert(0) += 1;
    }
    counts
}

/// Documents paired with their occurrence counts, ascending by count.
/// Equal counts are ordered by document name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedResult {
    entries: Vec<(String, u64)>,
}

impl RankedResult {
    pub fn from_counts(counts: HashMap<String, u64>) -> Self {
        let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
        entries.sort_by(|(doc_a, count_a), (doc_b, count_b)| {
            count_a.cmp(count_b).then_with(|| doc_a.cmp(doc_b))
        });
        Self { entries }
    }

    pub fn from_documents<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_counts(count_occurrences(documents))
    }

    /// Parses the `doc count doc count ...` form written by [`CountAndRank`].
    /// Entries are kept in the order they appear.
    pub fn parse(serialized: &str) -> anyhow::Result<Self> {
        let mut entries = vec![];
        let mut tokens = serialized.split_whitespace();
        while let Some(document) = tokens.next() {
            let count = tokens
                .next()
                .with_context(|| format!("Document `{document}` has no count"))?;
            let count = count
                .parse::<u64>()
                .with_context(|| format!("Invalid count `{count}` for document `{document}`"))?;
            entries.push((document.to_string(), count));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_for(&self, document: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(doc, _)| doc == document)
            .map(|(_, count)| *count)
    }

    pub fn total_occurrences(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for RankedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (document, count)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{document} {count}")?;
        }
        Ok(())
    }
}

/// Turns the occurrence list of one term into its ranked output record.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountAndRank;

impl Reducer for CountAndRank {
    fn reduce(
        &self,
        key: &str,
        values: &mut dyn Iterator<Item = Value>,
        emitter: &mut dyn ReduceEmitter,
    ) -> anyhow::Result<()> {
        let ranked = RankedResult::from_documents(values);
        if ranked.is_empty() {
            tracing::debug!("Skipping empty group for `{key}`");
            return Ok(());
        }
        emitter.emit(key.to_string(), ranked.to_string());
        Ok(())
    }
}
