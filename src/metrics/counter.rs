use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use super::desc::{Children, Desc, SharedChildren};
use crate::Result;

/// A monotonically increasing counter.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Adds the given value to the counter.
    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    /// Returns the current value.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A family of counters partitioned by label values.
#[derive(Debug, Clone)]
pub struct CounterVec {
    children: SharedChildren<Counter>,
}

impl CounterVec {
    pub(crate) fn new(desc: Desc) -> Self {
        Self { children: Arc::new(Children::new(desc)) }
    }

    pub(crate) fn desc(&self) -> &Desc {
        self.children.desc()
    }

    /// Returns the counter for the given label values, creating it on first use.
    ///
    /// Values are matched positionally against the family's label names; a
    /// wrong count is [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument).
    pub fn with_label_values(&self, values: &[&str]) -> Result<Counter> {
        self.children.get_or_create(values, Counter::default)
    }

    pub(crate) fn collect(&self) -> Vec<(Vec<String>, u64)> {
        self.children.snapshot().into_iter().map(|(labels, counter)| (labels, counter.get())).collect()
    }

    pub(crate) fn same_family(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.children, &other.children)
    }
}
