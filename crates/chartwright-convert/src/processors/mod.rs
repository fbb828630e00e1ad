//! Resource converters
//!
//! One module per supported kind plus the passthrough converter used for
//! everything else.

mod configmap;
mod default;
mod deployment;
mod namespace;
mod rbac;
mod secret;
mod service;
mod serviceaccount;

pub use configmap::ConfigMapProcessor;
pub use default::DefaultProcessor;
pub use deployment::DeploymentProcessor;
pub(crate) use deployment::IMAGE_PULL_SECRETS;
pub use namespace::NamespaceProcessor;
pub use rbac::RbacProcessor;
pub use secret::SecretProcessor;
pub use service::ServiceProcessor;
pub use serviceaccount::ServiceAccountProcessor;

use chartwright_core::{AnyObject, ResourceObject};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::config::ChartConfig;
use crate::error::{ConvertError, Result};
use crate::meta::is_reserved_label;
use crate::processor::ProcessorChain;
use crate::yaml;

/// The built-in converters in dispatch order
pub fn standard_chain(config: &ChartConfig) -> ProcessorChain {
    ProcessorChain::builder()
        .with(DeploymentProcessor::new(config.image_pull_secrets))
        .with(ServiceProcessor)
        .with(ConfigMapProcessor)
        .with(SecretProcessor)
        .with(ServiceAccountProcessor)
        .with(RbacProcessor)
        .with(NamespaceProcessor)
        .fallback(DefaultProcessor)
        .build()
}

/// Check apiVersion and kind of `obj`
pub(crate) fn is_kind(obj: &ResourceObject, api_version: &str, kind: &str) -> bool {
    obj.kind() == kind && obj.api_version() == api_version
}

/// Top-level field of `obj` as a mapping, empty when absent
pub(crate) fn object_field(obj: &ResourceObject, field: &str) -> Result<AnyObject> {
    match obj.root().get(field) {
        None | Some(JsonValue::Null) => Ok(AnyObject::new()),
        Some(JsonValue::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ConvertError::malformed(obj, format!("{} is not a mapping", field))),
    }
}

/// Label selector with the chart-managed keys removed
pub(crate) fn selector_labels(
    obj: &ResourceObject,
    value: Option<&JsonValue>,
    field: &str,
) -> Result<BTreeMap<String, String>> {
    let Some(JsonValue::Object(map)) = value else {
        return Ok(BTreeMap::new());
    };

    map.iter()
        .filter(|(key, _)| !is_reserved_label(key))
        .map(|(key, value)| match value.as_str() {
            Some(s) => Ok((key.clone(), s.to_string())),
            None => Err(ConvertError::malformed(
                obj,
                format!("{} '{}' must be a string", field, key),
            )),
        })
        .collect()
}

/// Render a label block followed by the chart's selector labels include
///
/// `indent` is the column of the labels themselves.
pub(crate) fn labels_block(
    labels: &BTreeMap<String, String>,
    chart_name: &str,
    indent: usize,
) -> Result<String> {
    let mut out = String::new();
    if !labels.is_empty() {
        out.push_str(&yaml::to_yaml_indented(labels, indent)?);
        out.push('\n');
    }
    out.push_str(&format!(
        "{}{{{{- include \"{}.selectorLabels\" . | nindent {} }}}}",
        " ".repeat(indent.saturating_sub(2)),
        chart_name,
        indent
    ));
    Ok(out)
}

/// Copy of `map` without `fields`, keeping the original field order
pub(crate) fn without(map: &AnyObject, fields: &[&str]) -> AnyObject {
    map.iter()
        .filter(|(key, _)| !fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Append `key:` followed by `tree` rendered one level deeper
pub(crate) fn push_tree(out: &mut String, key: &str, tree: &AnyObject, indent: usize) -> Result<()> {
    if tree.is_empty() {
        return Ok(());
    }
    out.push('\n');
    out.push_str(&format!("{}{}:\n", " ".repeat(indent), key));
    out.push_str(&yaml::render_tree(tree, indent + 2)?);
    Ok(())
}
