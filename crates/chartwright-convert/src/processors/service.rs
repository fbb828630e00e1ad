use chartwright_core::{AppMeta, ResourceObject, Value, ValuesMap};
use serde_json::Value as JsonValue;

use super::{is_kind, labels_block, object_field, selector_labels, without};
use crate::error::{ConvertError, Result};
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::{Template, object_filename};
use crate::yaml;

/// Spec fields the cluster assigns or the template writes itself
const SKIPPED_SPEC_FIELDS: [&str; 5] = ["type", "selector", "ports", "clusterIP", "clusterIPs"];

/// Parameterizes Service type and ports
///
/// The selector keeps its original labels and also matches the chart's
/// selector labels, so it selects the pods of the chart's workloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceProcessor;

impl Processor for ServiceProcessor {
    fn name(&self) -> &'static str {
        "Service"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if !is_kind(obj, "v1", "Service") {
            return Ok(Outcome::Declined);
        }

        let prefix = app.trim_name(obj.name());
        let spec = object_field(obj, "spec")?;
        let mut values = ValuesMap::new();
        let values_err = |source| ConvertError::Values {
            object: obj.to_string(),
            source,
        };

        let mut body = process_obj_meta(app, obj)?;
        body.push_str("\nspec:");

        if let Some(service_type) = spec.get("type").and_then(JsonValue::as_str) {
            let expr = values
                .add(service_type, &[prefix, "type"])
                .map_err(values_err)?;
            body.push_str(&format!("\n  type: {}", expr));
        }

        let selector = selector_labels(obj, spec.get("selector"), "selector")?;
        body.push_str("\n  selector:\n");
        body.push_str(&labels_block(&selector, app.chart_name(), 4)?);

        match spec.get("ports").cloned().and_then(Value::from_json) {
            Some(ports @ Value::List(_)) => {
                let expr = values
                    .add_yaml(ports, 2, true, &[prefix, "ports"])
                    .map_err(values_err)?;
                body.push_str(&format!("\n  ports: {}", expr));
            }
            Some(_) => return Err(ConvertError::malformed(obj, "spec.ports is not a list")),
            None => {}
        }

        let rest = without(&spec, &SKIPPED_SPEC_FIELDS);
        if !rest.is_empty() {
            body.push('\n');
            body.push_str(&yaml::render_tree(&rest, 2)?);
        }

        let filename = object_filename(prefix, "service");
        Ok(Outcome::Emitted(Template::new(filename, values, body)))
    }
}
