use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use super::{
    HistogramSnapshot,
    desc::{Children, Desc, SharedChildren},
};
use crate::{Error, Result};

/// A histogram with fixed upper-bound buckets.
///
/// Observations are lock-free: one bucket counter, the total count and the
/// sum (an `f64` stored as bits and updated with a CAS loop).
#[derive(Debug, Clone)]
pub struct Histogram {
    core: Arc<HistogramCore>,
}

#[derive(Debug)]
struct HistogramCore {
    upper_bounds: Arc<[f64]>,
    // Per-bucket counts, not cumulative; the extra slot is +Inf.
    counts: Box<[AtomicU64]>,
    count: AtomicU64,
    sum_bits: AtomicU64,
}

impl Histogram {
    fn new(upper_bounds: Arc<[f64]>) -> Self {
        let counts = (0..=upper_bounds.len()).map(|_| AtomicU64::new(0)).collect();
        Self {
            core: Arc::new(HistogramCore {
                upper_bounds,
                counts,
                count: AtomicU64::new(0),
                sum_bits: AtomicU64::new(0f64.to_bits()),
            }),
        }
    }

    /// Records a value.
    pub fn observe(&self, value: f64) {
        let core = &self.core;
        let index = core.upper_bounds.iter().position(|bound| value <= *bound).unwrap_or(core.upper_bounds.len());
        core.counts[index].fetch_add(1, Ordering::Relaxed);

        let mut current = core.sum_bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match core.sum_bits.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        core.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of observations.
    pub fn count(&self) -> u64 {
        self.core.count.load(Ordering::Relaxed)
    }

    /// Returns the sum of all observations.
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.core.sum_bits.load(Ordering::Relaxed))
    }

    /// Returns cumulative bucket counts, sum and count.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut cumulative = 0;
        let buckets = self
            .core
            .upper_bounds
            .iter()
            .zip(self.core.counts.iter())
            .map(|(bound, count)| {
                cumulative += count.load(Ordering::Relaxed);
                (*bound, cumulative)
            })
            .collect();
        HistogramSnapshot { buckets, sum: self.sum(), count: self.count() }
    }
}

/// A family of histograms partitioned by label values.
#[derive(Debug, Clone)]
pub struct HistogramVec {
    children: SharedChildren<Histogram>,
    upper_bounds: Arc<[f64]>,
}

impl HistogramVec {
    pub(crate) fn new(desc: Desc, buckets: Vec<f64>) -> Result<Self> {
        if buckets.is_empty() {
            return Err(Error::invalid_argument(format!("'{}' needs at least one bucket", desc.fq_name)));
        }
        if buckets.iter().any(|b| b.is_nan()) || buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::invalid_argument(format!("'{}' buckets must be strictly increasing", desc.fq_name)));
        }

        // +Inf is implicit
        let upper_bounds: Vec<f64> = buckets.into_iter().filter(|b| b.is_finite()).collect();
        Ok(Self { children: Arc::new(Children::new(desc)), upper_bounds: upper_bounds.into() })
    }

    pub(crate) fn desc(&self) -> &Desc {
        self.children.desc()
    }

    /// Returns the configured bucket upper bounds (without `+Inf`).
    pub fn buckets(&self) -> &[f64] {
        &self.upper_bounds
    }

    /// Returns the histogram for the given label values, creating it on first use.
    pub fn with_label_values(&self, values: &[&str]) -> Result<Histogram> {
        self.children.get_or_create(values, || Histogram::new(Arc::clone(&self.upper_bounds)))
    }

    pub(crate) fn collect(&self) -> Vec<(Vec<String>, HistogramSnapshot)> {
        self.children.snapshot().into_iter().map(|(labels, histogram)| (labels, histogram.snapshot())).collect()
    }

    pub(crate) fn same_family(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.children, &other.children)
    }
}
