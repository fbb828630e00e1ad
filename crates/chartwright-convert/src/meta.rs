//! Templated object headers
//!
//! Every converter starts its template with the same header: `apiVersion`,
//! `kind` and a `metadata` block where the name follows the chart's naming
//! helper, the namespace belongs to the Helm release and the chart's standard
//! labels are included.

use chartwright_core::{AppMeta, ResourceObject};
use phf::phf_set;

use crate::error::Result;
use crate::yaml;

/// Labels Helm's `<chart>.labels` helper already sets
static RESERVED_LABELS: phf::Set<&'static str> = phf_set! {
    "app.kubernetes.io/name",
    "app.kubernetes.io/instance",
    "app.kubernetes.io/version",
    "app.kubernetes.io/managed-by",
    "helm.sh/chart",
};

/// Check whether a label key is owned by the chart's label helper
pub fn is_reserved_label(key: &str) -> bool {
    RESERVED_LABELS.contains(key)
}

/// Render the templated header of `obj`
///
/// The returned string has no trailing newline.
pub fn process_obj_meta(app: &AppMeta, obj: &ResourceObject) -> Result<String> {
    let mut labels = obj.labels()?;
    labels.retain(|key, _| !is_reserved_label(key));
    let annotations = obj.annotations()?;

    let mut meta = String::new();
    meta.push_str(&format!("apiVersion: {}\n", obj.api_version()));
    meta.push_str(&format!("kind: {}\n", obj.kind()));
    meta.push_str("metadata:\n");
    // the API server requires CRD names to stay `<plural>.<group>`
    let name = if obj.is_crd() {
        obj.name().to_string()
    } else {
        app.templated_name(obj.name())
    };
    meta.push_str(&format!("  name: {}\n", name));

    // Cluster-scoped objects never get a namespace
    if obj.namespace().is_some() {
        meta.push_str("  namespace: {{ .Release.Namespace | quote }}\n");
    }

    meta.push_str("  labels:\n");
    if !labels.is_empty() {
        meta.push_str(&yaml::to_yaml_indented(&labels, 4)?);
        meta.push('\n');
    }
    meta.push_str(&format!(
        "  {{{{- include \"{}.labels\" . | nindent 4 }}}}\n",
        app.chart_name()
    ));

    if !annotations.is_empty() {
        meta.push_str("  annotations:\n");
        meta.push_str(&yaml::to_yaml_indented(&annotations, 4)?);
        meta.push('\n');
    }

    Ok(meta.trim_end().to_string())
}
