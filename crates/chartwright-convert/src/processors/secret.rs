use chartwright_core::{AnyObject, AppMeta, ResourceObject, ValuesMap};
use serde_json::Value as JsonValue;

use super::{is_kind, object_field, push_tree};
use crate::error::{ConvertError, Result};
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::Template;

/// Replaces Secret contents with required values
///
/// Secret material never reaches `values.yaml`: each key gets an empty
/// placeholder and the template fails to render until it is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretProcessor;

impl Processor for SecretProcessor {
    fn name(&self) -> &'static str {
        "Secret"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if !is_kind(obj, "v1", "Secret") {
            return Ok(Outcome::Declined);
        }

        let prefix = app.trim_name(obj.name());
        let mut values = ValuesMap::new();

        let mut template_field = |field: &str, base64: bool| -> Result<AnyObject> {
            let mut out = AnyObject::new();
            for key in object_field(obj, field)?.keys() {
                let expr = values
                    .add_secret(base64, &[prefix, key.as_str()])
                    .map_err(|source| ConvertError::Values {
                        object: obj.to_string(),
                        source,
                    })?;
                out.insert(key.clone(), JsonValue::String(expr));
            }
            Ok(out)
        };
        let data = template_field("data", true)?;
        let string_data = template_field("stringData", false)?;

        let mut body = process_obj_meta(app, obj)?;
        push_tree(&mut body, "data", &data, 0)?;
        push_tree(&mut body, "stringData", &string_data, 0)?;
        if let Some(secret_type) = obj.get_str(&["type"]) {
            body.push_str(&format!("\ntype: {}", secret_type));
        }

        Ok(Outcome::Emitted(Template::new("secret.yaml", values, body)))
    }
}
