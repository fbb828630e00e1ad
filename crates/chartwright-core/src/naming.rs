//! Application naming
//!
//! Naming decisions need global knowledge of the whole object set, so naming
//! happens in two steps:
//!
//! 1. A [`NamingCollector`] observes every object (namespace, common name
//!    prefix, known names).
//! 2. [`NamingCollector::finish`] freezes the result into an [`AppMeta`]
//!    snapshot. Converters only ever see `AppMeta`, so every object has been
//!    observed before any object is templated.

use std::collections::HashSet;

use crate::object::ResourceObject;

/// Characters stripped from the left of a name after prefix removal
const NAME_SEPARATORS: &[char] = &['-', '.', '/', '_', ' '];

/// Two objects disagreed on the application namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConflict {
    /// Namespace kept so far
    pub previous: String,
    /// Namespace that replaced it
    pub current: String,
    /// Object that introduced the new namespace
    pub object: String,
}

/// Accumulates naming facts while objects are collected
#[derive(Debug, Clone)]
pub struct NamingCollector {
    chart_name: String,
    namespace: Option<String>,
    common_prefix: Option<String>,
    known_names: HashSet<String>,
}

impl NamingCollector {
    pub fn new(chart_name: impl Into<String>) -> Self {
        Self {
            chart_name: chart_name.into(),
            namespace: None,
            common_prefix: None,
            known_names: HashSet::new(),
        }
    }

    /// Record one object
    ///
    /// Namespace objects contribute their own name as the namespace, other
    /// objects their `metadata.namespace`. Namespace and CRD names are not
    /// representative of the application's naming and are left out of the
    /// common prefix. A namespace disagreement is returned (and logged); the
    /// most recently observed namespace wins.
    pub fn observe(&mut self, obj: &ResourceObject) -> Option<NamespaceConflict> {
        self.known_names.insert(obj.name().to_string());

        if !obj.is_namespace() && !obj.is_crd() {
            let prefix = match self.common_prefix.take() {
                None => obj.name().to_string(),
                Some(prefix) => longest_common_prefix(&prefix, obj.name()).to_string(),
            };
            self.common_prefix = Some(prefix);
        }

        let observed = if obj.is_namespace() {
            Some(obj.name())
        } else {
            obj.namespace()
        }?;

        let conflict = match &self.namespace {
            Some(previous) if previous != observed => {
                tracing::warn!(
                    previous = %previous,
                    current = %observed,
                    object = %obj,
                    "objects belong to different namespaces, keeping the last one"
                );
                Some(NamespaceConflict {
                    previous: previous.clone(),
                    current: observed.to_string(),
                    object: obj.to_string(),
                })
            }
            _ => None,
        };
        self.namespace = Some(observed.to_string());
        conflict
    }

    /// Common prefix observed so far
    pub fn common_prefix(&self) -> &str {
        self.common_prefix.as_deref().unwrap_or("")
    }

    /// Freeze the collected facts
    pub fn finish(self) -> AppMeta {
        AppMeta {
            chart_name: self.chart_name,
            namespace: self.namespace.unwrap_or_default(),
            common_prefix: self.common_prefix.unwrap_or_default(),
            known_names: self.known_names,
        }
    }
}

/// Immutable naming snapshot handed to converters
#[derive(Debug, Clone)]
pub struct AppMeta {
    chart_name: String,
    namespace: String,
    common_prefix: String,
    known_names: HashSet<String>,
}

impl AppMeta {
    pub fn chart_name(&self) -> &str {
        &self.chart_name
    }

    /// Application namespace, empty if no object carried one
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn common_prefix(&self) -> &str {
        &self.common_prefix
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_names.contains(name)
    }

    /// Strip the common prefix and leading separators from `name`
    ///
    /// Never returns an empty string: if nothing would be left, `name` is
    /// returned unchanged.
    pub fn trim_name<'a>(&self, name: &'a str) -> &'a str {
        let trimmed = name
            .strip_prefix(self.common_prefix.as_str())
            .unwrap_or(name)
            .trim_start_matches(NAME_SEPARATORS);
        if trimmed.is_empty() { name } else { trimmed }
    }

    /// Rewrite an object name to the chart's naming convention
    ///
    /// Names that do not belong to any observed object (for example a
    /// reference to an externally managed resource) are returned unchanged.
    pub fn templated_name(&self, name: &str) -> String {
        if !self.is_known(name) {
            return name.to_string();
        }
        self.templated_string(name)
    }

    /// Prefix arbitrary text with the chart's fullname helper
    pub fn templated_string(&self, text: &str) -> String {
        format!(
            "{{{{ include \"{}.fullname\" . }}}}-{}",
            self.chart_name,
            self.trim_name(text)
        )
    }
}

/// Longest common prefix of two strings, compared by code point
///
/// The result is a slice of `a`.
pub fn longest_common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let mut end = 0;
    for ((idx, ca), cb) in a.char_indices().zip(b.chars()) {
        if ca != cb {
            return &a[..idx];
        }
        end = idx + ca.len_utf8();
    }
    &a[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(kind: &str, name: &str, namespace: Option<&str>) -> ResourceObject {
        let mut metadata = serde_json::json!({ "name": name });
        if let Some(ns) = namespace {
            metadata["namespace"] = ns.into();
        }
        ResourceObject::from_json(serde_json::json!({
            "apiVersion": "v1",
            "kind": kind,
            "metadata": metadata,
        }))
        .unwrap()
    }

    fn collect(objects: &[ResourceObject]) -> AppMeta {
        let mut collector = NamingCollector::new("chart");
        for obj in objects {
            collector.observe(obj);
        }
        collector.finish()
    }

    fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn test_lcp_by_code_point() {
        assert_eq!(longest_common_prefix("abc-one", "abc-two"), "abc-");
        assert_eq!(longest_common_prefix("abc", "abcdef"), "abc");
        assert_eq!(longest_common_prefix("", "abc"), "");
        assert_eq!(longest_common_prefix("xyz", "abc"), "");
        assert_eq!(longest_common_prefix("größe-a", "größe-b"), "größe-");
        assert_eq!(longest_common_prefix("ñx", "ñy"), "ñ");
    }

    #[test]
    fn test_prefix_scenario() {
        let app = collect(&[
            object("ConfigMap", "abc-name1", Some("ns")),
            object("ConfigMap", "abc-name2", Some("ns")),
            object("Service", "abc-service", Some("ns")),
        ]);

        assert_eq!(app.common_prefix(), "abc-");
        assert_eq!(app.trim_name("abc-name1"), "name1");
        assert_eq!(app.namespace(), "ns");
    }

    #[test]
    fn test_prefix_is_order_independent() {
        let names = ["app-web-api", "app-web-worker", "app-db", "app-web"];
        let expected = {
            let objects: Vec<_> = names.iter().map(|n| object("Secret", n, None)).collect();
            collect(&objects).common_prefix().to_string()
        };
        assert_eq!(expected, "app-");

        for order in permutations(&names) {
            let objects: Vec<_> = order.iter().map(|n| object("Secret", n, None)).collect();
            assert_eq!(collect(&objects).common_prefix(), expected, "order: {:?}", order);
        }
    }

    #[test]
    fn test_namespace_object_skips_prefix() {
        let app = collect(&[
            object("Namespace", "my-operator-system", None),
            object("Secret", "my-operator-system", Some("my-operator-system")),
            object("Secret", "my-operator-webhook", Some("my-operator-system")),
        ]);

        assert_eq!(app.namespace(), "my-operator-system");
        assert_eq!(app.common_prefix(), "my-operator-");
    }

    #[test]
    fn test_namespace_only_sets_namespace() {
        let app = collect(&[object("Namespace", "team-a", None)]);

        assert_eq!(app.namespace(), "team-a");
        assert_eq!(app.common_prefix(), "");
    }

    #[test]
    fn test_crd_skips_prefix() {
        let app = collect(&[
            object("CustomResourceDefinition", "widgets.example.com", None),
            object("Deployment", "widget-controller", Some("w")),
            object("ServiceAccount", "widget-sa", Some("w")),
        ]);

        assert_eq!(app.common_prefix(), "widget-");
        assert!(app.is_known("widgets.example.com"));
    }

    #[test]
    fn test_namespace_conflict_last_wins() {
        let mut collector = NamingCollector::new("chart");
        assert!(collector.observe(&object("Secret", "a", Some("first"))).is_none());
        let conflict = collector
            .observe(&object("Secret", "b", Some("second")))
            .expect("conflict reported");

        assert_eq!(conflict.previous, "first");
        assert_eq!(conflict.current, "second");
        assert_eq!(collector.finish().namespace(), "second");
    }

    #[test]
    fn test_trim_name_never_empty() {
        let app = collect(&[object("Secret", "solo", None)]);

        assert_eq!(app.common_prefix(), "solo");
        assert_eq!(app.trim_name("solo"), "solo");

        let app = collect(&[
            object("Secret", "app-", None),
            object("Secret", "app-x", None),
        ]);
        assert_eq!(app.trim_name("app-"), "app-");
        assert_eq!(app.trim_name("app-x"), "x");
    }

    #[test]
    fn test_trim_name_strips_separators() {
        let app = collect(&[
            object("Secret", "app", None),
            object("Secret", "app._-web", None),
        ]);

        assert_eq!(app.trim_name("app._-web"), "web");
    }

    #[test]
    fn test_templated_name_gating() {
        let app = collect(&[
            object("Deployment", "shop-web", Some("shop")),
            object("Service", "shop-api", Some("shop")),
        ]);

        assert_eq!(
            app.templated_name("shop-web"),
            "{{ include \"chart.fullname\" . }}-web"
        );
        assert_eq!(app.templated_name("external-db"), "external-db");
        assert_eq!(
            app.templated_string("shop-cache.svc"),
            "{{ include \"chart.fullname\" . }}-cache.svc"
        );
    }
}
