use chartwright_core::{AnyObject, AppMeta, ResourceObject, ValuesMap};
use serde_json::Value as JsonValue;

use super::without;
use crate::error::{ConvertError, Result};
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::{Template, object_filename};
use crate::yaml;

const RBAC_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

const ROLE_KINDS: [&str; 2] = ["Role", "ClusterRole"];

const BINDING_KINDS: [&str; 2] = ["RoleBinding", "ClusterRoleBinding"];

const RELEASE_NAMESPACE: &str = "{{ .Release.Namespace }}";

/// Templates roles and role bindings
///
/// Bindings follow the chart's naming: the role reference and service
/// account subjects that point at converted objects are renamed, and
/// subjects living in the application namespace move to the release
/// namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct RbacProcessor;

impl Processor for RbacProcessor {
    fn name(&self) -> &'static str {
        "RBAC"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if obj.api_version() != RBAC_API_VERSION {
            return Ok(Outcome::Declined);
        }
        let kind = obj.kind();
        let is_binding = BINDING_KINDS.contains(&kind);
        if !is_binding && !ROLE_KINDS.contains(&kind) {
            return Ok(Outcome::Declined);
        }

        let mut rest = without(obj.root(), &["apiVersion", "kind", "metadata"]);
        if is_binding {
            template_binding(app, obj, &mut rest)?;
        }

        let mut body = process_obj_meta(app, obj)?;
        if !rest.is_empty() {
            body.push('\n');
            body.push_str(&yaml::render_tree(&rest, 0)?);
        }

        let filename = object_filename(app.trim_name(obj.name()), kind);
        Ok(Outcome::Emitted(Template::new(filename, ValuesMap::new(), body)))
    }
}

fn template_binding(app: &AppMeta, obj: &ResourceObject, binding: &mut AnyObject) -> Result<()> {
    let Some(JsonValue::Object(role_ref)) = binding.get_mut("roleRef") else {
        return Err(ConvertError::malformed(obj, "roleRef is not a mapping"));
    };
    if let Some(JsonValue::String(name)) = role_ref.get_mut("name") {
        *name = app.templated_name(name);
    }

    let Some(subjects) = binding.get_mut("subjects") else {
        return Ok(());
    };
    let Some(subjects) = subjects.as_array_mut() else {
        return Err(ConvertError::malformed(obj, "subjects is not a list"));
    };

    for subject in subjects.iter_mut() {
        let Some(subject) = subject.as_object_mut() else {
            return Err(ConvertError::malformed(obj, "subject is not a mapping"));
        };
        // users and groups are identities outside the chart
        if subject.get("kind").and_then(JsonValue::as_str) != Some("ServiceAccount") {
            continue;
        }
        if let Some(JsonValue::String(name)) = subject.get_mut("name") {
            *name = app.templated_name(name);
        }
        if let Some(JsonValue::String(namespace)) = subject.get_mut("namespace")
            && !app.namespace().is_empty()
            && namespace.as_str() == app.namespace()
        {
            *namespace = RELEASE_NAMESPACE.to_string();
        }
    }

    Ok(())
}
