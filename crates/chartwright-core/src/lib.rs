//! Chartwright Core - shared types for turning Kubernetes manifests into Helm charts
//!
//! This crate provides the primitives every resource converter builds on:
//! - `ResourceObject`: a decoded manifest with its identity extracted
//! - `NamingCollector` / `AppMeta`: chart-wide naming facts and name templating
//! - `ValuesMap`: the chart's `values.yaml` with deep merge and typed `add*` operations

pub mod error;
pub mod naming;
pub mod object;
pub mod values;

pub use error::{CoreError, Result};
pub use naming::{AppMeta, NamespaceConflict, NamingCollector, longest_common_prefix};
pub use object::{AnyObject, CRD_KIND, Gvk, NAMESPACE_KIND, ResourceObject};
pub use values::{Value, ValuesMap, to_lower_camel};
