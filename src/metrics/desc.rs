use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{Error, Result};

/// Naming and help text for a metric family.
///
/// The fully-qualified name joins the non-empty parts of
/// `namespace`, `subsystem` and `name` with `_`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    namespace: String,
    subsystem: String,
    name: String,
    help: String,
    const_labels: BTreeMap<String, String>,
}

impl Opts {
    /// Creates options with a name and help text.
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self { name: name.into(), help: help.into(), ..Self::default() }
    }

    /// Sets the namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the subsystem.
    #[must_use]
    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    /// Sets labels attached to every series of the family.
    #[must_use]
    pub fn const_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.const_labels = labels;
        self
    }

    /// Returns the fully-qualified metric name.
    pub fn fq_name(&self) -> String {
        [self.namespace.as_str(), self.subsystem.as_str(), self.name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Validated identity of a metric family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Desc {
    pub(crate) fq_name: String,
    pub(crate) help: String,
    pub(crate) label_names: Vec<String>,
    pub(crate) const_labels: Vec<(String, String)>,
}

impl Desc {
    pub(crate) fn new(opts: Opts, label_names: &[&str]) -> Result<Self> {
        let fq_name = opts.fq_name();
        if !is_valid_metric_name(&fq_name) {
            return Err(Error::invalid_argument(format!("invalid metric name '{fq_name}'")));
        }

        let mut seen = Vec::with_capacity(label_names.len() + opts.const_labels.len());
        for name in label_names.iter().copied().chain(opts.const_labels.keys().map(String::as_str)) {
            if !is_valid_label_name(name) {
                return Err(Error::invalid_argument(format!("invalid label name '{name}' for '{fq_name}'")));
            }
            if seen.contains(&name) {
                return Err(Error::invalid_argument(format!("duplicate label name '{name}' for '{fq_name}'")));
            }
            seen.push(name);
        }

        Ok(Self {
            fq_name,
            help: opts.help,
            label_names: label_names.iter().map(|s| (*s).to_string()).collect(),
            const_labels: opts.const_labels.into_iter().collect(),
        })
    }

    /// Pairs label names with values, variable labels first.
    pub(crate) fn labels(&self, values: &[String]) -> Vec<(String, String)> {
        self.label_names.iter().cloned().zip(values.iter().cloned()).chain(self.const_labels.iter().cloned()).collect()
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    !name.starts_with("__")
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Children of a labelled family, keyed by label values.
#[derive(Debug)]
pub(crate) struct Children<M> {
    desc: Desc,
    map: RwLock<HashMap<Vec<String>, M>>,
}

impl<M: Clone> Children<M> {
    pub(crate) fn new(desc: Desc) -> Self {
        Self { desc, map: RwLock::new(HashMap::new()) }
    }

    pub(crate) fn desc(&self) -> &Desc {
        &self.desc
    }

    pub(crate) fn get_or_create(&self, values: &[&str], make: impl FnOnce() -> M) -> Result<M> {
        if values.len() != self.desc.label_names.len() {
            return Err(Error::invalid_argument(format!(
                "'{}' expects {} label values, got {}",
                self.desc.fq_name,
                self.desc.label_names.len(),
                values.len()
            )));
        }

        let key: Vec<String> = values.iter().map(|v| (*v).to_string()).collect();
        if let Some(child) = self.map.read().get(&key) {
            return Ok(child.clone());
        }

        let mut map = self.map.write();
        Ok(map.entry(key).or_insert_with(make).clone())
    }

    /// Returns every child, sorted by label values.
    pub(crate) fn snapshot(&self) -> Vec<(Vec<String>, M)> {
        let mut children: Vec<_> = self.map.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));
        children
    }
}

pub(crate) type SharedChildren<M> = Arc<Children<M>>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_fq_name() {
        assert_eq!(Opts::new("total", "").namespace("db").subsystem("requests").fq_name(), "db_requests_total");
        assert_eq!(Opts::new("total", "").subsystem("requests").fq_name(), "requests_total");
        assert_eq!(Opts::new("up", "").fq_name(), "up");
    }

    #[test]
    fn test_invalid_names() {
        let err = Desc::new(Opts::new("bad-name", ""), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = Desc::new(Opts::new("ok", ""), &["le gal"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = Desc::new(Opts::new("ok", ""), &["a", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(Desc::new(Opts::new("ok", ""), &["__reserved"]).is_err());
    }

    #[test]
    fn test_children_arity() {
        let children: Children<u8> = Children::new(Desc::new(Opts::new("x", ""), &["a", "b"]).unwrap());
        assert!(children.get_or_create(&["1"], || 0).is_err());
        assert_eq!(children.get_or_create(&["1", "2"], || 7).unwrap(), 7);
        assert_eq!(children.get_or_create(&["1", "2"], || 9).unwrap(), 7);
    }
}
