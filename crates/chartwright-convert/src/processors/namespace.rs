use chartwright_core::{AppMeta, ResourceObject};

use crate::error::Result;
use crate::processor::{Outcome, Processor};

/// Folds Namespace objects into the chart
///
/// Charts install into the release namespace, so the source namespace
/// produces no template of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct NamespaceProcessor;

impl Processor for NamespaceProcessor {
    fn name(&self) -> &'static str {
        "Namespace"
    }

    fn process(&self, _app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
        if obj.is_namespace() {
            Ok(Outcome::Absorbed)
        } else {
            Ok(Outcome::Declined)
        }
    }
}
