use chartwright_core::{AppMeta, ResourceObject, ValuesMap};

use super::without;
use crate::error::Result;
use crate::meta::process_obj_meta;
use crate::processor::{Outcome, Processor};
use crate::template::{Template, object_filename};
use crate::yaml;

/// Fields that never reach the passthrough body
const HEADER_FIELDS: [&str; 4] = ["apiVersion", "kind", "metadata", "status"];

/// Copies objects of unknown kinds with only their header templated
///
/// Namespaces are declined: the chart is installed into the release
/// namespace instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProcessor;

impl Processor for DefaultProcessor {
    fn name(&self) -> &'static str {
        "Default"
    }

    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if obj.is_namespace() {
            return Ok(Outcome::Declined);
        }

        let mut body = process_obj_meta(app, obj)?;
        let rest = without(obj.root(), &HEADER_FIELDS);
        if !rest.is_empty() {
            body.push('\n');
            body.push_str(&yaml::to_yaml_indented(&rest, 0)?);
        }

        let filename = object_filename(app.trim_name(obj.name()), obj.kind());
        Ok(Outcome::Emitted(Template::new(filename, ValuesMap::new(), body)))
    }
}
