use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::iter::FromIterator;

/// Scaled value of one field.
///
/// Fields published unscaled stay integers; anything divided becomes a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Integer(u64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Integer(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }
}

/// Floats always keep a fractional part (`2899.0`, not `2899`), the collector has always
/// received them that way.
impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            MetricValue::Integer(v) => serializer.serialize_u64(v),
            MetricValue::Float(v) => serializer.serialize_f64(v),
        }
    }
}

/// Metrics decoded from one response, keyed by metric name, in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedMetrics {
    entries: Vec<(&'static str, MetricValue)>,
}

impl DecodedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`. An overwritten metric keeps its original position.
    pub fn insert(&mut self, name: &'static str, value: MetricValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, MetricValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(&'static str, MetricValue)> for DecodedMetrics {
    fn from_iter<I: IntoIterator<Item = (&'static str, MetricValue)>>(iter: I) -> Self {
        let mut metrics = DecodedMetrics::new();
        for (name, value) in iter {
            metrics.insert(name, value);
        }
        metrics
    }
}

impl Serialize for DecodedMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Last successfully decoded cycle, kept for the exporter's dump route.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Snapshot {
    pub timestamp: u64,
    pub raw: String,
    pub metrics: DecodedMetrics,
}
