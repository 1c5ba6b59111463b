//! src/functions.rs

pub type Key = String;
pub type Value = String;

pub trait MapEmitter {
    fn emit(&mut self, key: Key, value: Value);
}

pub trait ReduceEmitter {
    fn emit(&mut self, key: Key, value: Value);
}

/// A map function. Implementations must be pure: the substrate may run the
/// same record more than once and keeps only one attempt's output.
pub trait Mapper: Send + Sync {
    fn map(&self, key: &str, value: &str, emitter: &mut dyn MapEmitter) -> anyhow::Result<()>;
}

/// A reduce function. `values` is the complete group for `key`, in no
/// particular order.
pub trait Reducer: Send + Sync {
    fn reduce(
        &self,
        key: &str,
        values: &mut dyn Iterator<Item = Value>,
        emitter: &mut dyn ReduceEmitter,
    ) -> anyhow::Result<()>;
}

impl MapEmitter for Vec<(Key, Value)> {
    fn emit(&mut self, key: Key, value: Value) {
        self.push((key, value));
    }
}

impl ReduceEmitter for Vec<(Key, Value)> {
    fn emit(&mut self, key: Key, value: Value) {
        self.push((key, value));
    }
}
