//! Chart values with deep merge support
//!
//! [`ValuesMap`] models a chart's `values.yaml`. The `add*` operations are the
//! contract between converters and the chart: each one stores a default value
//! under a camelCased path and returns the template expression that reads it
//! back at render time.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// Characters that separate words in a values key
const WORD_SEPARATORS: [char; 4] = ['_', '-', '.', ' '];

/// A single value in the chart values tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    Map(ValuesMap),
}

impl Value {
    /// Convert a foreign JSON tree, dropping nulls
    ///
    /// Returns `None` when the value itself is null.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(Self::Bool(b)),
            JsonValue::Number(n) => Some(Self::Number(n)),
            JsonValue::String(s) => Some(Self::String(s)),
            JsonValue::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            JsonValue::Object(map) => Some(Self::Map(ValuesMap(
                map.into_iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                    .collect(),
            ))),
        }
    }

    /// Convert back into a JSON tree
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(map) => map.to_json(),
        }
    }

    pub fn as_map(&self) -> Option<&ValuesMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        // NaN and infinities have no JSON number form
        serde_json::Number::from_f64(n)
            .map(Self::Number)
            .unwrap_or_else(|| Self::String(n.to_string()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<ValuesMap> for Value {
    fn from(map: ValuesMap) -> Self {
        Self::Map(map)
    }
}

/// Nested values tree for a chart's `values.yaml`
///
/// Keys are kept sorted so the emitted file is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValuesMap(BTreeMap<String, Value>);

impl ValuesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse values from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        match Value::from_json(value) {
            Some(Value::Map(map)) => Ok(map),
            None => Ok(Self::new()),
            Some(other) => Err(CoreError::UnsupportedValue {
                message: format!("values root must be a map, got {}", other.type_name()),
            }),
        }
    }

    /// Serialize as `values.yaml` content
    pub fn to_yaml(&self) -> Result<String> {
        if self.is_empty() {
            return Ok("{}\n".to_string());
        }
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Get a value by path segments (no case normalization)
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for segment in rest {
            current = current.as_map()?.0.get(*segment)?;
        }
        Some(current)
    }

    /// Set a value by path segments (no case normalization)
    ///
    /// Intermediate maps are created as needed. An intermediate segment that
    /// already holds a non-map value is an error.
    pub fn set<S: AsRef<str>>(&mut self, path: &[S], value: Value) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Err(CoreError::UnsupportedValue {
                message: "empty values path".to_string(),
            });
        };

        let mut current = &mut self.0;
        for segment in parents {
            let entry = current
                .entry(segment.as_ref().to_string())
                .or_insert_with(|| Value::Map(ValuesMap::new()));
            current = match entry {
                Value::Map(map) => &mut map.0,
                _ => {
                    return Err(CoreError::ValuesPath {
                        path: join_path(path),
                        segment: segment.as_ref().to_string(),
                    });
                }
            };
        }
        current.insert(last.as_ref().to_string(), value);
        Ok(())
    }

    /// Store `value` and return the expression that renders it
    ///
    /// Strings are piped through `quote`; lists and maps are rendered with
    /// `toYaml` at an indent derived from the path depth.
    pub fn add(&mut self, value: impl Into<Value>, path: &[&str]) -> Result<String> {
        let value = value.into();
        let path = camel_path(path);
        let dotted = join_path(&path);

        let expr = match &value {
            Value::String(_) => format!("{{{{ .Values.{} | quote }}}}", dotted),
            Value::List(_) | Value::Map(_) => format!(
                "{{{{ toYaml .Values.{} | nindent {} }}}}",
                dotted,
                path.len() * 2
            ),
            Value::Bool(_) | Value::Number(_) => format!("{{{{ .Values.{} }}}}", dotted),
        };

        self.set(&path, value)?;
        Ok(expr)
    }

    /// Store an empty secret placeholder and return a `required` expression
    ///
    /// Set `base64` for Secret `data` entries, leave it unset for `stringData`.
    pub fn add_secret(&mut self, base64: bool, path: &[&str]) -> Result<String> {
        let path = camel_path(path);
        let dotted = join_path(&path);
        self.set(&path, Value::String(String::new()))?;

        let mut expr = format!(
            "{{{{ required \"{0} is required\" .Values.{0}",
            dotted
        );
        if base64 {
            expr.push_str(" | b64enc");
        }
        expr.push_str(" | quote }}");
        Ok(expr)
    }

    /// Store `value` and return an expression rendering it as YAML
    ///
    /// With `indent > 0` the output is re-indented (`nindent` when `new_line`
    /// is set, `indent` otherwise) so it stays valid inside a block.
    pub fn add_yaml(
        &mut self,
        value: impl Into<Value>,
        indent: usize,
        new_line: bool,
        path: &[&str],
    ) -> Result<String> {
        let path = camel_path(path);
        let dotted = join_path(&path);
        self.set(&path, value.into())?;

        let expr = match (indent, new_line) {
            (0, _) => format!("{{{{ .Values.{} | toYaml }}}}", dotted),
            (n, true) => format!("{{{{ .Values.{} | toYaml | nindent {} }}}}", dotted, n),
            (n, false) => format!("{{{{ .Values.{} | toYaml | indent {} }}}}", dotted, n),
        };
        Ok(expr)
    }

    /// Deep merge `other` into this map
    ///
    /// Rules:
    /// - Scalars: incoming value replaces the existing one
    /// - Lists: incoming items are appended
    /// - Maps: recursive merge
    /// - Map against non-map: error
    pub fn merge(&mut self, other: ValuesMap) -> Result<()> {
        let mut path = Vec::new();
        deep_merge(&mut self.0, other.0, &mut path)
    }

    /// Drop repeated entries of the list at `path`, keeping first occurrences
    ///
    /// Returns how many entries were removed.
    pub fn dedup_list(&mut self, path: &[&str]) -> usize {
        let Some((first, rest)) = path.split_first() else {
            return 0;
        };
        let mut current = self.0.get_mut(*first);
        for segment in rest {
            current = match current {
                Some(Value::Map(map)) => map.0.get_mut(*segment),
                _ => None,
            };
        }
        let Some(Value::List(items)) = current else {
            return 0;
        };

        let before = items.len();
        let mut kept: Vec<Value> = Vec::with_capacity(before);
        for item in items.drain(..) {
            if !kept.contains(&item) {
                kept.push(item);
            }
        }
        *items = kept;
        before - items.len()
    }
}

fn deep_merge(
    base: &mut BTreeMap<String, Value>,
    overlay: BTreeMap<String, Value>,
    path: &mut Vec<String>,
) -> Result<()> {
    for (key, incoming) in overlay {
        path.push(key.clone());
        match base.get_mut(&key) {
            None => {
                base.insert(key, incoming);
            }
            Some(existing) => match (existing, incoming) {
                (Value::Map(existing), Value::Map(incoming)) => {
                    deep_merge(&mut existing.0, incoming.0, path)?;
                }
                (Value::List(existing), Value::List(incoming)) => {
                    existing.extend(incoming);
                }
                (existing, incoming) => {
                    if matches!(existing, Value::Map(_)) || matches!(incoming, Value::Map(_)) {
                        return Err(CoreError::ValuesMerge {
                            path: path.join("."),
                            message: format!(
                                "cannot merge {} into {}",
                                incoming.type_name(),
                                existing.type_name()
                            ),
                        });
                    }
                    *existing = incoming;
                }
            },
        }
        path.pop();
    }
    Ok(())
}

/// Normalize a values key to lowerCamelCase
///
/// `MY_NAME`, `my-name`, `my.name` and `my_name` all become `myName`.
/// Already camelCased keys are returned unchanged.
pub fn to_lower_camel(segment: &str) -> String {
    let source = if segment == segment.to_uppercase() {
        segment.to_lowercase()
    } else {
        segment.to_string()
    };

    let mut out = String::with_capacity(source.len());
    for word in source.split(WORD_SEPARATORS).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        if out.is_empty() {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    out
}

fn camel_path(path: &[&str]) -> Vec<String> {
    path.iter().map(|segment| to_lower_camel(segment)).collect()
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}
