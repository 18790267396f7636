use std::{collections::BTreeMap, fmt, sync::Arc};

use parking_lot::RwLock;

use super::{CounterVec, HistogramVec, Opts, desc::Desc, text};
use crate::{Error, Result};

/// A collection of metric families.
///
/// Cheap to clone; clones share the same families. Registration is
/// idempotent: asking for a family that already exists with the same kind
/// and label names returns the existing one, so several clients can share a
/// registry without coordinating who registers first.
#[derive(Clone, Default)]
pub struct Registry {
    families: Arc<RwLock<BTreeMap<String, Family>>>,
}

#[derive(Clone)]
enum Family {
    Counter(CounterVec),
    Histogram(HistogramVec),
}

impl Family {
    fn desc(&self) -> &Desc {
        match self {
            Family::Counter(vec) => vec.desc(),
            Family::Histogram(vec) => vec.desc(),
        }
    }

    fn kind(&self) -> MetricKind {
        match self {
            Family::Counter(_) => MetricKind::Counter,
            Family::Histogram(_) => MetricKind::Histogram,
        }
    }
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a counter family, or returns the existing one.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::AlreadyRegistered`](crate::ErrorKind::AlreadyRegistered) if the name is taken
    /// by a family of another kind or with other label names;
    /// [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) for malformed names.
    pub fn counter_vec(&self, opts: Opts, label_names: &[&str]) -> Result<CounterVec> {
        let desc = Desc::new(opts, label_names)?;
        match self.register(desc, |desc| Ok(Family::Counter(CounterVec::new(desc))), MetricKind::Counter)? {
            Family::Counter(vec) => Ok(vec),
            Family::Histogram(_) => Err(Error::internal("registry returned a histogram for a counter")),
        }
    }

    /// Registers a histogram family, or returns the existing one.
    ///
    /// Buckets are upper bounds in increasing order; `+Inf` is implicit.
    pub fn histogram_vec(&self, opts: Opts, label_names: &[&str], buckets: Vec<f64>) -> Result<HistogramVec> {
        let desc = Desc::new(opts, label_names)?;
        let family = self.register(
            desc,
            |desc| HistogramVec::new(desc, buckets).map(Family::Histogram),
            MetricKind::Histogram,
        )?;
        match family {
            Family::Histogram(vec) => Ok(vec),
            Family::Counter(_) => Err(Error::internal("registry returned a counter for a histogram")),
        }
    }

    fn register(
        &self,
        desc: Desc,
        make: impl FnOnce(Desc) -> Result<Family>,
        kind: MetricKind,
    ) -> Result<Family> {
        let check = |existing: &Family| -> Result<Family> {
            let current = existing.desc();
            if existing.kind() != kind
                || current.label_names != desc.label_names
                || current.const_labels != desc.const_labels
            {
                return Err(Error::already_registered(format!(
                    "metric '{}' is already registered as a {} with labels {:?}",
                    current.fq_name,
                    existing.kind(),
                    current.label_names
                )));
            }
            Ok(existing.clone())
        };

        if let Some(existing) = self.families.read().get(&desc.fq_name) {
            return check(existing);
        }

        let mut families = self.families.write();
        if let Some(existing) = families.get(&desc.fq_name) {
            return check(existing);
        }
        let name = desc.fq_name.clone();
        let family = make(desc)?;
        families.insert(name, family.clone());
        Ok(family)
    }

    /// Returns `true` if `vec` is the family registered under its name.
    pub fn contains_counter(&self, vec: &CounterVec) -> bool {
        matches!(self.families.read().get(&vec.desc().fq_name), Some(Family::Counter(existing)) if existing.same_family(vec))
    }

    /// Returns `true` if `vec` is the family registered under its name.
    pub fn contains_histogram(&self, vec: &HistogramVec) -> bool {
        matches!(self.families.read().get(&vec.desc().fq_name), Some(Family::Histogram(existing)) if existing.same_family(vec))
    }

    /// Snapshots every family, sorted by name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let families: Vec<Family> = self.families.read().values().cloned().collect();
        families.iter().map(snapshot).collect()
    }

    /// Snapshots one family by fully-qualified name.
    pub fn family(&self, name: &str) -> Option<MetricFamily> {
        let family = self.families.read().get(name).cloned();
        family.as_ref().map(snapshot)
    }

    /// Renders every family in the Prometheus text exposition format.
    pub fn encode_text(&self) -> String {
        text::encode(&self.gather())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("families", &self.families.read().keys().collect::<Vec<_>>()).finish()
    }
}

fn snapshot(family: &Family) -> MetricFamily {
    let desc = family.desc();
    let metrics = match family {
        Family::Counter(vec) => vec
            .collect()
            .into_iter()
            .map(|(values, count)| MetricSample { labels: desc.labels(&values), value: SampleValue::Counter(count) })
            .collect(),
        Family::Histogram(vec) => vec
            .collect()
            .into_iter()
            .map(|(values, h)| MetricSample { labels: desc.labels(&values), value: SampleValue::Histogram(h) })
            .collect(),
    };
    MetricFamily { name: desc.fq_name.clone(), help: desc.help.clone(), kind: family.kind(), metrics }
}

/// Kind of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonic counter.
    Counter,
    /// Bucketed histogram.
    Histogram,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Counter => f.write_str("counter"),
            MetricKind::Histogram => f.write_str("histogram"),
        }
    }
}

/// Snapshot of one metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    /// Fully-qualified name.
    pub name: String,
    /// Help text.
    pub help: String,
    /// Family kind.
    pub kind: MetricKind,
    /// One sample per label combination, sorted by label values.
    pub metrics: Vec<MetricSample>,
}

impl MetricFamily {
    /// Returns the sample whose variable label values equal `values`, in order.
    pub fn sample(&self, values: &[&str]) -> Option<&MetricSample> {
        self.metrics.iter().find(|sample| {
            sample.labels.len() >= values.len()
                && sample.labels.iter().zip(values).all(|((_, actual), expected)| actual == expected)
        })
    }
}

/// Snapshot of one labelled series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Label pairs: variable labels in declaration order, then constant labels.
    pub labels: Vec<(String, String)>,
    /// Current value.
    pub value: SampleValue,
}

impl MetricSample {
    /// Returns the counter value, if this is a counter sample.
    pub fn counter(&self) -> Option<u64> {
        match &self.value {
            SampleValue::Counter(value) => Some(*value),
            SampleValue::Histogram(_) => None,
        }
    }

    /// Returns the histogram snapshot, if this is a histogram sample.
    pub fn histogram(&self) -> Option<&HistogramSnapshot> {
        match &self.value {
            SampleValue::Histogram(h) => Some(h),
            SampleValue::Counter(_) => None,
        }
    }

    /// Returns the value of a label.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Value of a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// Counter value.
    Counter(u64),
    /// Histogram state.
    Histogram(HistogramSnapshot),
}

/// Point-in-time histogram state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)` pairs, without `+Inf`.
    pub buckets: Vec<(f64, u64)>,
    /// Sum of observations.
    pub sum: f64,
    /// Number of observations (the `+Inf` bucket).
    pub count: u64,
}
