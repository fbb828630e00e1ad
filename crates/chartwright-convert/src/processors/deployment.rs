use chartwright_core::{AnyObject, AppMeta, ResourceObject, Value, ValuesMap, to_lower_camel};
use serde_json::Value as JsonValue;

use super::{is_kind, labels_block, object_field, selector_labels, without};
use crate::error::{ConvertError, Result};
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::{Template, object_filename};
use crate::yaml;

/// Column of pod spec fields in the rendered template
const POD_SPEC_INDENT: usize = 6;

/// Top-level values key shared by every pod's pull secrets
pub(crate) const IMAGE_PULL_SECRETS: &str = "imagePullSecrets";

/// Object references inside a container that may point at chart objects
const CONTAINER_REFS: [&[&str]; 4] = [
    &["valueFrom", "configMapKeyRef", "name"],
    &["valueFrom", "secretKeyRef", "name"],
    &["configMapRef", "name"],
    &["secretRef", "name"],
];

/// Object references inside a volume
const VOLUME_REFS: [&[&str]; 3] = [
    &["configMap", "name"],
    &["secret", "secretName"],
    &["persistentVolumeClaim", "claimName"],
];

/// Parameterizes replicas, images, pull policies, resources and env values
///
/// References to other converted objects (config maps, secrets, claims,
/// service accounts) are rewritten to their templated names.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeploymentProcessor {
    image_pull_secrets: bool,
}

impl DeploymentProcessor {
    /// `image_pull_secrets` wires the pod's pull secrets to a top-level value
    pub fn new(image_pull_secrets: bool) -> Self {
        Self { image_pull_secrets }
    }
}

impl Processor for DeploymentProcessor {
    fn name(&self) -> &'static str {
        "Deployment"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if !is_kind(obj, "apps/v1", "Deployment") {
            return Ok(Outcome::Declined);
        }

        let mut pod = PodTemplater {
            app,
            obj,
            prefix: app.trim_name(obj.name()),
            values: ValuesMap::new(),
        };
        let spec = object_field(obj, "spec")?;
        let chart = app.chart_name();

        let mut body = process_obj_meta(app, obj)?;
        body.push_str("\nspec:");

        if let Some(replicas) = spec.get("replicas").cloned().and_then(Value::from_json) {
            if !matches!(replicas, Value::Number(_)) {
                return Err(ConvertError::malformed(obj, "spec.replicas is not a number"));
            }
            let expr = pod.add(replicas, &["replicas"])?;
            body.push_str(&format!("\n  replicas: {}", expr));
        }

        let match_labels = selector_labels(
            obj,
            spec.get("selector").and_then(|s| s.get("matchLabels")),
            "selector.matchLabels",
        )?;
        body.push_str("\n  selector:\n    matchLabels:\n");
        body.push_str(&labels_block(&match_labels, chart, 6)?);

        let rest = without(&spec, &["replicas", "selector", "template"]);
        if !rest.is_empty() {
            body.push('\n');
            body.push_str(&yaml::render_tree(&rest, 2)?);
        }

        let Some(JsonValue::Object(template)) = spec.get("template") else {
            return Err(ConvertError::malformed(obj, "spec.template is missing"));
        };
        let pod_meta = template.get("metadata");
        let pod_labels = selector_labels(
            obj,
            pod_meta.and_then(|m| m.get("labels")),
            "template.metadata.labels",
        )?;
        body.push_str("\n  template:\n    metadata:\n      labels:\n");
        body.push_str(&labels_block(&pod_labels, chart, 8)?);

        if let Some(JsonValue::Object(annotations)) = pod_meta.and_then(|m| m.get("annotations")) {
            if !annotations.is_empty() {
                body.push_str("\n      annotations:\n");
                body.push_str(&yaml::to_yaml_indented(annotations, 8)?);
            }
        }

        let Some(JsonValue::Object(pod_spec)) = template.get("spec") else {
            return Err(ConvertError::malformed(obj, "spec.template.spec is missing"));
        };
        let mut pod_spec = pod_spec.clone();
        pod.template_spec(&mut pod_spec, self.image_pull_secrets)?;
        body.push_str("\n    spec:\n");
        body.push_str(&yaml::render_tree(&pod_spec, POD_SPEC_INDENT)?);

        let filename = object_filename(pod.prefix, "deployment");
        Ok(Outcome::Emitted(Template::new(filename, pod.values, body)))
    }
}

/// Rewrites a pod spec in place, collecting values under the object's prefix
struct PodTemplater<'a> {
    app: &'a AppMeta,
    obj: &'a ResourceObject,
    prefix: &'a str,
    values: ValuesMap,
}

impl PodTemplater<'_> {
    fn add(&mut self, value: impl Into<Value>, path: &[&str]) -> Result<String> {
        let full = full_path(self.prefix, path);
        self.values
            .add(value, &full)
            .map_err(|source| ConvertError::Values {
                object: self.obj.to_string(),
                source,
            })
    }

    fn add_yaml(&mut self, value: Value, indent: usize, path: &[&str]) -> Result<String> {
        let full = full_path(self.prefix, path);
        self.values
            .add_yaml(value, indent, true, &full)
            .map_err(|source| ConvertError::Values {
                object: self.obj.to_string(),
                source,
            })
    }

    /// `.Values` reference for a path, without filters
    fn reference(&self, path: &[&str]) -> String {
        let camel: Vec<String> = full_path(self.prefix, path)
            .iter()
            .map(|segment| to_lower_camel(segment))
            .collect();
        format!(".Values.{}", camel.join("."))
    }

    fn template_spec(&mut self, pod_spec: &mut AnyObject, image_pull_secrets: bool) -> Result<()> {
        for field in ["initContainers", "containers"] {
            let Some(containers) = pod_spec.get_mut(field) else {
                continue;
            };
            let Some(containers) = containers.as_array_mut() else {
                return Err(ConvertError::malformed(self.obj, format!("{} is not a list", field)));
            };
            for container in containers.iter_mut() {
                let Some(container) = container.as_object_mut() else {
                    return Err(ConvertError::malformed(self.obj, "container is not a mapping"));
                };
                self.template_container(container)?;
            }
        }

        if let Some(JsonValue::Array(volumes)) = pod_spec.get_mut("volumes") {
            for volume in volumes.iter_mut() {
                for path in VOLUME_REFS {
                    self.rename(volume, path);
                }
                if let Some(JsonValue::Array(sources)) = pointer_mut(volume, &["projected", "sources"]) {
                    for source in sources.iter_mut() {
                        self.rename(source, &["configMap", "name"]);
                        self.rename(source, &["secret", "name"]);
                    }
                }
            }
        }

        if let Some(JsonValue::String(account)) = pod_spec.get_mut("serviceAccountName") {
            *account = self.app.templated_name(account);
        }

        if image_pull_secrets {
            let mut existing = pod_spec
                .get("imagePullSecrets")
                .cloned()
                .unwrap_or_else(|| JsonValue::Array(Vec::new()));
            if let JsonValue::Array(secrets) = &mut existing {
                for secret in secrets.iter_mut() {
                    self.rename(secret, &["name"]);
                }
            }
            let existing = Value::from_json(existing).unwrap_or_else(|| Value::List(Vec::new()));
            self.values
                .set(&[IMAGE_PULL_SECRETS], existing)
                .map_err(|source| ConvertError::Values {
                    object: self.obj.to_string(),
                    source,
                })?;
            // renamed entries hold template actions, so the list goes through tpl
            pod_spec.insert(
                "imagePullSecrets".to_string(),
                JsonValue::String(format!(
                    "{{{{- tpl (.Values.{} | default list | toYaml) . | nindent {} }}}}",
                    IMAGE_PULL_SECRETS,
                    POD_SPEC_INDENT + 2
                )),
            );
        } else if let Some(JsonValue::Array(secrets)) = pod_spec.get_mut("imagePullSecrets") {
            for secret in secrets.iter_mut() {
                self.rename(secret, &["name"]);
            }
        }

        Ok(())
    }

    fn template_container(&mut self, container: &mut AnyObject) -> Result<()> {
        let name = container
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ConvertError::malformed(self.obj, "container has no name"))?
            .to_string();
        let name = name.as_str();

        if let Some(image) = container.get("image").and_then(JsonValue::as_str) {
            let image_expr = if image.contains('@') {
                // digests stay pinned as a whole
                self.add(image.to_string(), &[name, "image"])?
            } else {
                let (repository, tag) = split_image(image);
                let (repository, tag) = (repository.to_string(), tag.unwrap_or("latest").to_string());
                self.add(repository, &[name, "image", "repository"])?;
                self.add(tag, &[name, "image", "tag"])?;
                format!(
                    "{{{{ {} }}}}:{{{{ {} | default .Chart.AppVersion }}}}",
                    self.reference(&[name, "image", "repository"]),
                    self.reference(&[name, "image", "tag"])
                )
            };
            container.insert("image".to_string(), JsonValue::String(image_expr));
        }

        if let Some(policy) = container.get("imagePullPolicy").and_then(JsonValue::as_str) {
            let expr = self.add(policy.to_string(), &[name, "imagePullPolicy"])?;
            container.insert("imagePullPolicy".to_string(), JsonValue::String(expr));
        }

        if let Some(resources) = container.get("resources").cloned().and_then(Value::from_json) {
            if resources.as_map().is_some_and(|r| !r.is_empty()) {
                let expr = self.add_yaml(resources, POD_SPEC_INDENT + 4, &[name, "resources"])?;
                container.insert("resources".to_string(), JsonValue::String(expr));
            }
        }

        if let Some(JsonValue::Array(env)) = container.get_mut("env") {
            for var in env.iter_mut() {
                let Some(var_name) = var.get("name").and_then(JsonValue::as_str).map(str::to_string)
                else {
                    continue;
                };
                let var_name = var_name.as_str();
                if let Some(value) = var.get("value").cloned().and_then(Value::from_json) {
                    let expr = self.add(value, &[name, "env", var_name])?;
                    if let Some(var) = var.as_object_mut() {
                        var.insert("value".to_string(), JsonValue::String(expr));
                    }
                }
                for path in &CONTAINER_REFS[..2] {
                    self.rename(var, path);
                }
            }
        }

        if let Some(JsonValue::Array(env_from)) = container.get_mut("envFrom") {
            for source in env_from.iter_mut() {
                for path in &CONTAINER_REFS[2..] {
                    self.rename(source, path);
                }
            }
        }

        Ok(())
    }

    /// Replace the string at `path` with its templated name
    fn rename(&self, value: &mut JsonValue, path: &[&str]) {
        if let Some(JsonValue::String(name)) = pointer_mut(value, path) {
            *name = self.app.templated_name(name);
        }
    }
}

fn full_path<'p>(prefix: &'p str, path: &[&'p str]) -> Vec<&'p str> {
    let mut full = Vec::with_capacity(path.len() + 1);
    full.push(prefix);
    full.extend_from_slice(path);
    full
}

fn pointer_mut<'v>(value: &'v mut JsonValue, path: &[&str]) -> Option<&'v mut JsonValue> {
    path.iter()
        .try_fold(value, |current, segment| current.get_mut(*segment))
}

/// Split `registry/name:tag` into repository and tag
///
/// A colon before the last `/` belongs to a registry port.
fn split_image(image: &str) -> (&str, Option<&str>) {
    let name_start = image.rfind('/').map_or(0, |i| i + 1);
    match image[name_start..].rfind(':') {
        Some(i) => (&image[..name_start + i], Some(&image[name_start + i + 1..])),
        None => (image, None),
    }
}
