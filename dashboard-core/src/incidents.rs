use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A backend-reported incident, kept as the opaque JSON object it arrived as.
///
/// The record is never mutated after it is received, so it can be sent back
/// verbatim when a fix is requested for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Incident {
    fields: Arc<Map<String, Value>>,
}

impl Incident {
    /// Wraps a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self {
                fields: Arc::new(fields),
            }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object((*self.fields).clone())
    }

    pub fn raw_data(&self) -> Option<&Map<String, Value>> {
        self.fields.get("raw_data").and_then(Value::as_object)
    }

    /// `raw_data.source`, e.g. `"AI"` or `"Rules (sshd)"`.
    pub fn source(&self) -> Option<&str> {
        self.raw_data()
            .and_then(|raw| raw.get("source"))
            .and_then(Value::as_str)
    }

    /// `raw_data.cmd`; `None` when absent, null, or blank.
    pub fn command(&self) -> Option<&str> {
        self.raw_data()
            .and_then(|raw| raw.get("cmd"))
            .and_then(Value::as_str)
            .filter(|cmd| !cmd.trim().is_empty())
    }

    pub fn pid(&self) -> Option<i64> {
        self.raw_data()
            .and_then(|raw| raw.get("pid"))
            .and_then(Value::as_i64)
    }

    pub fn exit_code(&self) -> Option<i64> {
        self.raw_data()
            .and_then(|raw| raw.get("exit_code"))
            .and_then(Value::as_i64)
    }

    /// Numeric `risk_score`. Numeric strings are accepted since some sensors
    /// send them quoted.
    pub fn risk_score(&self) -> Option<f64> {
        match self.fields.get("risk_score")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(self.risk_score().unwrap_or(f64::NAN))
    }

    /// Top-level string field such as `what`, `why`, `when` or `category`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn is_ai_sourced(&self, marker: &str) -> bool {
        self.source().is_some_and(|source| source.contains(marker))
    }
}

/// Ordered, immutable set of incidents as of one sync.
#[derive(Clone, Debug)]
pub struct Snapshot {
    incidents: Arc<[Incident]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Snapshot {
    pub fn new(incidents: Vec<Incident>) -> Self {
        Self {
            incidents: incidents.into(),
        }
    }

    /// Parses a `GET /data` payload. Anything other than an array of objects
    /// is rejected as a whole.
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Array(items) = value else {
            return None;
        };
        items
            .into_iter()
            .map(Incident::from_value)
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn get(&self, index: usize) -> Option<&Incident> {
        self.incidents.get(index)
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.incidents.iter()
    }

    /// True when both handles share the same allocation.
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.incidents, &other.incidents)
    }
}
