use chartwright_core::{AnyObject, AppMeta, ResourceObject, Value, ValuesMap};
use serde_json::Value as JsonValue;

use super::{is_kind, object_field, push_tree};
use crate::error::{ConvertError, Result};
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::Template;

/// Moves ConfigMap `data` entries to values
///
/// Every entry becomes `<name>.<key>` in values. Multi-line entries are
/// rendered with `toYaml` so block content keeps its layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigMapProcessor;

impl Processor for ConfigMapProcessor {
    fn name(&self) -> &'static str {
        "ConfigMap"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if !is_kind(obj, "v1", "ConfigMap") {
            return Ok(Outcome::Declined);
        }

        let prefix = app.trim_name(obj.name());
        let mut values = ValuesMap::new();
        let mut data = AnyObject::new();

        for (key, raw) in object_field(obj, "data")? {
            let Some(value) = Value::from_json(raw) else {
                continue;
            };
            if matches!(value, Value::List(_) | Value::Map(_)) {
                return Err(ConvertError::malformed(
                    obj,
                    format!("data '{}' must be a string", key),
                ));
            }

            let path = [prefix, key.as_str()];
            let multiline = value.as_str().is_some_and(|s| s.contains('\n'));
            let expr = if multiline {
                values.add_yaml(value, 4, true, &path)
            } else {
                values.add(value, &path)
            }
            .map_err(|source| ConvertError::Values {
                object: obj.to_string(),
                source,
            })?;
            data.insert(key, JsonValue::String(expr));
        }

        let mut body = process_obj_meta(app, obj)?;
        push_tree(&mut body, "data", &data, 0)?;
        push_tree(&mut body, "binaryData", &object_field(obj, "binaryData")?, 0)?;
        if let Some(immutable) = obj.get(&["immutable"]).and_then(JsonValue::as_bool) {
            body.push_str(&format!("\nimmutable: {}", immutable));
        }

        Ok(Outcome::Emitted(Template::new("configmap.yaml", values, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::testing::{app, objects};

    const MANIFESTS: &str = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: shop-config
  namespace: shop
data:
  LOG_LEVEL: debug
  app.conf: |
    a=1
    b=2
  workers: 4
immutable: true
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: shop-web
  namespace: shop"#;

    #[test]
    fn test_data_moves_to_values() {
        let objs = objects(MANIFESTS);
        let app = app(&objs);

        let Outcome::Emitted(template) = ConfigMapProcessor.process(&app, &objs[0]).unwrap() else {
            panic!("configmap not emitted");
        };

        assert_eq!(template.filename(), "configmap.yaml");
        assert_eq!(
            template.body(),
            r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: {{ include "shop.fullname" . }}-config
  namespace: {{ .Release.Namespace | quote }}
  labels:
  {{- include "shop.labels" . | nindent 4 }}
data:
  LOG_LEVEL: {{ .Values.config.logLevel | quote }}
  app.conf: {{ .Values.config.appConf | toYaml | nindent 4 }}
  workers: {{ .Values.config.workers }}
immutable: true"#
        );

        let values = template.values();
        assert_eq!(
            values.get(&["config", "logLevel"]),
            Some(&Value::from("debug"))
        );
        assert_eq!(
            values.get(&["config", "appConf"]),
            Some(&Value::from("a=1\nb=2\n"))
        );
        assert_eq!(values.get(&["config", "workers"]), Some(&Value::from(4i64)));
    }

    #[test]
    fn test_other_kinds_declined() {
        let objs = objects(MANIFESTS);
        let app = app(&objs);

        assert!(matches!(
            ConfigMapProcessor.process(&app, &objs[1]).unwrap(),
            Outcome::Declined
        ));
    }

    #[test]
    fn test_nested_data_rejected() {
        let objs = objects(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\ndata:\n  nested:\n    a: b",
        );
        let app = app(&objs);

        assert!(matches!(
            ConfigMapProcessor.process(&app, &objs[0]),
            Err(ConvertError::Malformed { .. })
        ));
    }
}
