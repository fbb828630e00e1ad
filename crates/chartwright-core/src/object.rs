//! Untyped Kubernetes resource objects
//!
//! A [`ResourceObject`] is a decoded manifest document. Its identity
//! (group, version, kind, name, namespace) is extracted once at construction
//! time; everything else stays as a raw JSON tree that converters read.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoreError, Result};

/// Raw object tree
pub type AnyObject = serde_json::Map<String, JsonValue>;

/// Kind of the namespace object
pub const NAMESPACE_KIND: &str = "Namespace";

/// Kind of custom resource definitions
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// Group-Version-Kind of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gvk {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Gvk {
    /// Split an `apiVersion` string (`apps/v1`, `v1`) into group and version
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Reassemble the `apiVersion` string
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.kind, self.version)
        } else {
            write!(f, "{}.{}.{}", self.kind, self.version, self.group)
        }
    }
}

/// A decoded Kubernetes manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject {
    gvk: Gvk,
    name: String,
    namespace: Option<String>,
    root: AnyObject,
}

impl ResourceObject {
    /// Build an object from a decoded JSON tree
    ///
    /// `apiVersion`, `kind` and `metadata.name` are required.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let JsonValue::Object(root) = value else {
            return Err(CoreError::invalid_object("document is not a mapping"));
        };

        let api_version = root
            .get("apiVersion")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| CoreError::invalid_object("missing apiVersion"))?;
        let kind = root
            .get("kind")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| CoreError::invalid_object("missing kind"))?;
        let gvk = Gvk::from_api_version(api_version, kind);

        let metadata = root.get("metadata").and_then(JsonValue::as_object);
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(JsonValue::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CoreError::invalid_object(format!("{} has no metadata.name", kind)))?
            .to_string();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(JsonValue::as_str)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);

        Ok(Self {
            gvk,
            name,
            namespace,
            root,
        })
    }

    /// Parse a single YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Self::from_json(value)
    }

    pub fn gvk(&self) -> &Gvk {
        &self.gvk
    }

    pub fn kind(&self) -> &str {
        &self.gvk.kind
    }

    pub fn api_version(&self) -> String {
        self.gvk.api_version()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `metadata.namespace`, `None` for cluster-scoped objects
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is_namespace(&self) -> bool {
        self.gvk.kind == NAMESPACE_KIND
    }

    pub fn is_crd(&self) -> bool {
        self.gvk.kind == CRD_KIND
    }

    pub fn root(&self) -> &AnyObject {
        &self.root
    }

    /// Look up a nested field by path segments
    pub fn get(&self, path: &[&str]) -> Option<&JsonValue> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.get(*first)?;
        for segment in rest {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    /// Nested field as a string
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(JsonValue::as_str)
    }

    /// `metadata.labels`
    pub fn labels(&self) -> Result<BTreeMap<String, String>> {
        self.string_map("labels")
    }

    /// `metadata.annotations`
    pub fn annotations(&self) -> Result<BTreeMap<String, String>> {
        self.string_map("annotations")
    }

    fn string_map(&self, field: &str) -> Result<BTreeMap<String, String>> {
        let Some(value) = self.get(&["metadata", field]) else {
            return Ok(BTreeMap::new());
        };
        let map = match value {
            JsonValue::Null => return Ok(BTreeMap::new()),
            JsonValue::Object(map) => map,
            _ => {
                return Err(CoreError::invalid_object(format!(
                    "{}: metadata.{} is not a mapping",
                    self, field
                )));
            }
        };

        map.iter()
            .map(|(key, value)| match value {
                JsonValue::String(s) => Ok((key.clone(), s.clone())),
                other => Err(CoreError::invalid_object(format!(
                    "{}: {} '{}' must be a string, got {}",
                    self, field, key, other
                ))),
            })
            .collect()
    }
}

impl fmt::Display for ResourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", ns, self.gvk.kind, self.name),
            None => write!(f, "{}/{}", self.gvk.kind, self.name),
        }
    }
}
