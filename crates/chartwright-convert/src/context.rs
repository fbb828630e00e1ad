//! Conversion context
//!
//! Conversion runs in two phases:
//!
//! 1. **Collect**: objects are pushed in arrival order and observed by the
//!    naming collector.
//! 2. **Convert**: the naming facts are frozen, then every object is
//!    dispatched in the same order. Partial values are merged into the chart
//!    values and templates are collected.
//!
//! Cancellation is checked between objects. A cancelled run produces nothing.

use chartwright_core::{NamingCollector, ResourceObject, ValuesMap};
use tokio_util::sync::CancellationToken;

use crate::config::ChartConfig;
use crate::error::{ConversionWarning, ConvertError, Result};
use crate::output::Output;
use crate::processor::{Dispatch, ProcessorChain};
use crate::processors::{IMAGE_PULL_SECRETS, standard_chain};
use crate::template::Template;

/// A converted chart, ready for output
#[derive(Debug, Clone)]
pub struct Chart {
    pub chart_name: String,
    pub app_name: String,
    /// Namespace the source objects lived in, empty if none
    pub namespace: String,
    /// Templates in input order
    pub templates: Vec<Template>,
    pub values: ValuesMap,
}

/// Result of a completed conversion
#[derive(Debug)]
pub struct Conversion {
    pub chart: Chart,
    pub warnings: Vec<ConversionWarning>,
}

/// Owns the objects of one conversion run
#[derive(Debug)]
pub struct Context {
    config: ChartConfig,
    chain: ProcessorChain,
    naming: NamingCollector,
    objects: Vec<ResourceObject>,
    warnings: Vec<ConversionWarning>,
}

impl Context {
    /// Context with the built-in converters
    pub fn new(config: ChartConfig) -> Self {
        let chain = standard_chain(&config);
        Self::with_chain(config, chain)
    }

    pub fn with_chain(config: ChartConfig, chain: ProcessorChain) -> Self {
        Self {
            naming: NamingCollector::new(config.chart_name.clone()),
            config,
            chain,
            objects: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Add an object to the run
    pub fn push(&mut self, obj: ResourceObject) {
        tracing::trace!(object = %obj, "collected");
        if let Some(conflict) = self.naming.observe(&obj) {
            self.warnings.push(ConversionWarning::namespace_conflict(&conflict));
        }
        self.objects.push(obj);
    }

    /// Push every decoded object, stopping at the first decode error
    ///
    /// Returns the number of objects added.
    pub fn extend<I>(&mut self, objects: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<ResourceObject>>,
    {
        let mut count = 0;
        for obj in objects {
            self.push(obj?);
            count += 1;
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Convert every collected object
    ///
    /// Returns `None` when `cancel` fired before the last object.
    pub fn convert(self, cancel: &CancellationToken) -> Result<Option<Conversion>> {
        let app = self.naming.finish();
        let mut warnings = self.warnings;
        let mut values = ValuesMap::new();
        let mut templates = Vec::with_capacity(self.objects.len());

        tracing::debug!(
            objects = self.objects.len(),
            prefix = app.common_prefix(),
            namespace = app.namespace(),
            "converting"
        );

        for obj in &self.objects {
            if cancel.is_cancelled() {
                tracing::info!("conversion cancelled, nothing written");
                return Ok(None);
            }

            let template = match self.chain.dispatch(&app, obj)? {
                Dispatch::Handled(Some(template)) => Some(template),
                Dispatch::Handled(None) => {
                    warnings.push(ConversionWarning::absorbed(obj));
                    None
                }
                Dispatch::Fallback(template) => {
                    warnings.push(ConversionWarning::unknown_kind(obj));
                    Some(template)
                }
                Dispatch::Unhandled => None,
            };

            if let Some(template) = template {
                values
                    .merge(template.values().clone())
                    .map_err(|source| ConvertError::Values {
                        object: obj.to_string(),
                        source,
                    })?;
                templates.push(template);
            }
        }

        if cancel.is_cancelled() {
            tracing::info!("conversion cancelled, nothing written");
            return Ok(None);
        }

        // every pod appends its pull secrets to the one shared list
        if self.config.image_pull_secrets {
            let dropped = values.dedup_list(&[IMAGE_PULL_SECRETS]);
            tracing::debug!(dropped, "deduplicated image pull secrets");
        }

        Ok(Some(Conversion {
            chart: Chart {
                chart_name: self.config.chart_name,
                app_name: self.config.app_name,
                namespace: app.namespace().to_string(),
                templates,
                values,
            },
            warnings,
        }))
    }

    /// Convert and hand the chart to `output`
    pub fn run(self, output: &mut dyn Output, cancel: &CancellationToken) -> Result<Option<Conversion>> {
        let Some(conversion) = self.convert(cancel)? else {
            return Ok(None);
        };
        output.write(&conversion.chart)?;
        Ok(Some(conversion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use crate::error::{WarningCategory, WarningSeverity};
    use crate::output::StreamWriter;
    use chartwright_core::Value;

    const MANIFESTS: &str = r#"
apiVersion: v1
kind: Namespace
metadata:
  name: shop
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: shop-first
  namespace: shop
data:
  key: one
---
apiVersion: example.com/v1
kind: Widget
metadata:
  name: shop-gizmo
  namespace: shop
spec:
  size: 1
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: shop-second
  namespace: shop
data:
  key: two
"#;

    fn context() -> Context {
        let config = ChartConfig::new("charts/shop", None).unwrap();
        let mut ctx = Context::new(config);
        ctx.extend(decode::from_str("test", MANIFESTS)).unwrap();
        ctx
    }

    #[test]
    fn test_same_file_templates_keep_input_order() {
        let conversion = context()
            .convert(&CancellationToken::new())
            .unwrap()
            .expect("not cancelled");
        let chart = conversion.chart;

        let files: Vec<_> = chart.templates.iter().map(Template::filename).collect();
        assert_eq!(files, vec!["configmap.yaml", "gizmo-widget.yaml", "configmap.yaml"]);
        assert!(chart.templates[0].body().contains(".Values.first.key"));
        assert!(chart.templates[2].body().contains(".Values.second.key"));

        assert_eq!(chart.namespace, "shop");
        assert_eq!(chart.values.get(&["first", "key"]), Some(&Value::from("one")));
        assert_eq!(chart.values.get(&["second", "key"]), Some(&Value::from("two")));
    }

    #[test]
    fn test_unknown_kind_warns_without_error() {
        let conversion = context()
            .convert(&CancellationToken::new())
            .unwrap()
            .expect("not cancelled");

        let unknown: Vec<_> = conversion
            .warnings
            .iter()
            .filter(|w| w.category == WarningCategory::UnknownKind)
            .collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].object, "shop/Widget/shop-gizmo");
    }

    #[test]
    fn test_namespace_is_absorbed() {
        let conversion = context()
            .convert(&CancellationToken::new())
            .unwrap()
            .expect("not cancelled");

        let absorbed: Vec<_> = conversion
            .warnings
            .iter()
            .filter(|w| w.category == WarningCategory::Absorbed)
            .collect();
        assert_eq!(absorbed.len(), 1);
        assert_eq!(absorbed[0].object, "Namespace/shop");
        assert_eq!(absorbed[0].severity, WarningSeverity::Info);
        assert!(
            conversion
                .chart
                .templates
                .iter()
                .all(|t| !t.body().contains("kind: Namespace"))
        );
    }

    #[test]
    fn test_pull_secrets_shared_across_deployments() {
        let config = ChartConfig::new("shop", None)
            .unwrap()
            .with_image_pull_secrets(true);
        let mut ctx = Context::new(config);
        ctx.extend(decode::from_str(
            "test",
            r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: shop-web
spec:
  template:
    spec:
      imagePullSecrets:
      - name: regcred
      - name: shop-registry
      containers:
      - name: app
        image: web:1.0
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: shop-api
spec:
  template:
    spec:
      imagePullSecrets:
      - name: regcred
      - name: shop-registry
      containers:
      - name: app
        image: api:1.0
---
apiVersion: v1
kind: Secret
metadata:
  name: shop-registry
type: kubernetes.io/dockerconfigjson
"#,
        ))
        .unwrap();

        let conversion = ctx.convert(&CancellationToken::new()).unwrap().unwrap();

        let Some(Value::List(secrets)) = conversion.chart.values.get(&["imagePullSecrets"]) else {
            panic!("imagePullSecrets is not a list");
        };
        let names: Vec<_> = secrets
            .iter()
            .map(|s| s.as_map().and_then(|m| m.get(&["name"])).and_then(Value::as_str))
            .collect();
        assert_eq!(
            names,
            vec![
                Some("regcred"),
                Some("{{ include \"shop.fullname\" . }}-registry"),
            ]
        );
    }

    #[test]
    fn test_namespace_conflict_is_a_warning() {
        let config = ChartConfig::new("shop", None).unwrap();
        let mut ctx = Context::new(config);
        ctx.extend(decode::from_str(
            "test",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n  namespace: one\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n  namespace: two\n",
        ))
        .unwrap();

        let conversion = ctx.convert(&CancellationToken::new()).unwrap().unwrap();
        assert_eq!(conversion.chart.namespace, "two");
        assert_eq!(conversion.warnings[0].category, WarningCategory::Namespace);
    }

    #[test]
    fn test_cancelled_run_writes_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut output = StreamWriter::new(Vec::new());

        let result = context().run(&mut output, &cancel).unwrap();

        assert!(result.is_none());
        assert!(output.into_inner().is_empty());
    }

    #[test]
    fn test_decode_error_stops_collection() {
        let config = ChartConfig::new("shop", None).unwrap();
        let mut ctx = Context::new(config);
        let err = ctx
            .extend(decode::from_str("test", "apiVersion: v1\nkind: ConfigMap\n"))
            .unwrap_err();

        assert!(matches!(err, ConvertError::InvalidDocument { .. }));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_values_conflict_is_fatal() {
        let config = ChartConfig::new("shop", None)
            .unwrap()
            .with_image_pull_secrets(true);
        let mut ctx = Context::new(config);
        // the config map claims the values key the pull secrets list needs
        ctx.extend(decode::from_str(
            "test",
            r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: image-pull-secrets
data:
  key: value
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
      - name: app
        image: app:1.0
"#,
        ))
        .unwrap();

        let err = ctx.convert(&CancellationToken::new()).unwrap_err();
        match err {
            ConvertError::Values { object, .. } => assert_eq!(object, "Deployment/web"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
