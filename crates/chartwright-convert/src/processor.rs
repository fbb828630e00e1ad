//! Processor dispatch
//!
//! A [`ProcessorChain`] holds resource converters in registration order. Each
//! object is offered to them in turn; the first one that does not decline
//! owns the object. Objects nobody claims go to the fallback converter, if
//! one is registered.

use chartwright_core::{AppMeta, ResourceObject};

use crate::error::{ConvertError, Result};
use crate::template::Template;

/// What a processor did with an object
#[derive(Debug)]
pub enum Outcome {
    /// Not this processor's kind
    Declined,
    /// Converted into a template
    Emitted(Template),
    /// Accepted without producing a template
    Absorbed,
}

/// A resource converter
pub trait Processor: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Convert `obj`, or decline it
    fn process(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome>;
}

/// Result of dispatching one object
#[derive(Debug)]
pub enum Dispatch {
    /// A registered processor accepted the object
    Handled(Option<Template>),
    /// Only the fallback accepted the object
    Fallback(Template),
    /// Nothing accepted the object
    Unhandled,
}

/// Ordered list of processors with an optional fallback
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
    fallback: Option<Box<dyn Processor>>,
}

impl ProcessorChain {
    pub fn builder() -> ProcessorChainBuilder {
        ProcessorChainBuilder::default()
    }

    /// Names of the registered processors, in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.processors
            .iter()
            .chain(self.fallback.iter())
            .map(|p| p.name())
            .collect()
    }

    /// Offer `obj` to each processor until one accepts it
    ///
    /// A failure of the accepting processor aborts dispatch; later processors
    /// are not tried.
    pub fn dispatch(&self, app: &AppMeta, obj: &ResourceObject) -> Result<Dispatch> {
        for processor in &self.processors {
            match run(processor.as_ref(), app, obj)? {
                Outcome::Declined => continue,
                Outcome::Emitted(template) => {
                    tracing::debug!(processor = processor.name(), object = %obj, file = template.filename(), "converted");
                    return Ok(Dispatch::Handled(Some(template)));
                }
                Outcome::Absorbed => {
                    tracing::debug!(processor = processor.name(), object = %obj, "absorbed");
                    return Ok(Dispatch::Handled(None));
                }
            }
        }

        let Some(fallback) = &self.fallback else {
            return Ok(Dispatch::Unhandled);
        };
        match run(fallback.as_ref(), app, obj)? {
            Outcome::Emitted(template) => {
                tracing::warn!(object = %obj, gvk = %obj.gvk(), "no converter for kind, copied as-is");
                Ok(Dispatch::Fallback(template))
            }
            Outcome::Absorbed => Ok(Dispatch::Handled(None)),
            Outcome::Declined => {
                tracing::debug!(object = %obj, "skipped");
                Ok(Dispatch::Unhandled)
            }
        }
    }
}

fn run(processor: &dyn Processor, app: &AppMeta, obj: &ResourceObject) -> Result<Outcome> {
    processor
        .process(app, obj)
        .map_err(|source| ConvertError::Processor {
            processor: processor.name(),
            object: obj.to_string(),
            source: Box::new(source),
        })
}

impl std::fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorChain")
            .field("processors", &self.names())
            .finish()
    }
}

/// Builder for [`ProcessorChain`]
#[derive(Default)]
pub struct ProcessorChainBuilder {
    processors: Vec<Box<dyn Processor>>,
    fallback: Option<Box<dyn Processor>>,
}

impl ProcessorChainBuilder {
    /// Append a processor; earlier registrations take precedence
    pub fn with(mut self, processor: impl Processor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Processor tried when every registered one declined
    pub fn fallback(mut self, processor: impl Processor + 'static) -> Self {
        self.fallback = Some(Box::new(processor));
        self
    }

    pub fn build(self) -> ProcessorChain {
        ProcessorChain {
            processors: self.processors,
            fallback: self.fallback,
        }
    }
}
