use chartwright_core::{AppMeta, ResourceObject, ValuesMap};
use serde_json::Value as JsonValue;

use super::{is_kind, without};
use crate::error::Result;
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::Template;
use crate::yaml;

/// Templates service accounts and the secrets they reference
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceAccountProcessor;

impl Processor for ServiceAccountProcessor {
    fn name(&self) -> &'static str {
        "ServiceAccount"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if !is_kind(obj, "v1", "ServiceAccount") {
            return Ok(Outcome::Declined);
        }

        let mut rest = without(obj.root(), &["apiVersion", "kind", "metadata"]);
        for field in ["secrets", "imagePullSecrets"] {
            let Some(JsonValue::Array(refs)) = rest.get_mut(field) else {
                continue;
            };
            for reference in refs.iter_mut() {
                if let Some(JsonValue::String(name)) = reference.get_mut("name") {
                    *name = app.templated_name(name);
                }
            }
        }

        let mut body = process_obj_meta(app, obj)?;
        if !rest.is_empty() {
            body.push('\n');
            body.push_str(&yaml::render_tree(&rest, 0)?);
        }

        Ok(Outcome::Emitted(Template::new(
            "serviceaccount.yaml",
            ValuesMap::new(),
            body,
        )))
    }
}
