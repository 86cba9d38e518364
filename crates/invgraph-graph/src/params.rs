//! Run-scoped query parameters.

use std::collections::BTreeMap;

use invgraph_core::compile::UPDATE_TAG;
use invgraph_core::schema::LASTUPDATED;
use serde_json::Value;

/// Named values bound to `$parameters`, shared by every row of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, Value>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for one sync pass: the run id as both `lastupdated` and `UPDATE_TAG`.
    pub fn for_run(update_tag: i64) -> Self {
        Self::new().with(LASTUPDATED, update_tag).with(UPDATE_TAG, update_tag)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The first of `names` that has no value.
    pub fn first_missing<'a>(&self, mut names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
        names.find(|name| !self.contains(name))
    }

    /// Parse a `NAME=VALUE` or `NAME:TYPE=VALUE` assignment.
    ///
    /// Untyped values are always strings, so `AWS_ID=012345678901` and
    /// `AWS_ID=123456789012` bind the same type. `TYPE` is one of `str`,
    /// `int`, `float`, `bool` or `json`.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Value), String> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE or NAME:TYPE=VALUE, got '{assignment}'"))?;
        let (name, kind) = match key.split_once(':') {
            Some((name, kind)) => (name.trim(), kind.trim()),
            None => (key.trim(), "str"),
        };
        if name.is_empty() {
            return Err(format!("missing parameter name in '{assignment}'"));
        }
        let value = match kind {
            "str" => Value::String(raw.to_string()),
            "int" => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("{name}: invalid int '{raw}': {e}"))?,
            "float" => raw
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|e| format!("{name}: invalid float '{raw}': {e}"))?,
            "bool" => raw
                .trim()
                .parse::<bool>()
                .map(Value::from)
                .map_err(|e| format!("{name}: invalid bool '{raw}': {e}"))?,
            "json" => serde_json::from_str(raw).map_err(|e| format!("{name}: invalid json '{raw}': {e}"))?,
            other => return Err(format!("{name}: unknown type '{other}', expected str, int, float, bool or json")),
        };
        Ok((name.to_string(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Parameters {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
