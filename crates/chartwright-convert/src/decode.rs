//! Manifest stream decoding
//!
//! Splits a multi-document YAML (or JSON) stream into [`ResourceObject`]s.
//! Empty documents are skipped and `kind: List` documents are flattened into
//! their items. Decoding stops at the first error.

use chartwright_core::{CoreError, ResourceObject};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::io;

use crate::error::{ConvertError, Result};

/// Iterator over the objects of a manifest stream
pub struct Documents<'de> {
    source_name: String,
    documents: serde_yaml::Deserializer<'de>,
    document: usize,
    pending: VecDeque<JsonValue>,
    failed: bool,
}

/// Decode objects from a reader
pub fn from_reader<'de, R>(source_name: impl Into<String>, reader: R) -> Documents<'de>
where
    R: io::Read + 'de,
{
    Documents::new(source_name, serde_yaml::Deserializer::from_reader(reader))
}

/// Decode objects from a string
pub fn from_str<'de>(source_name: impl Into<String>, input: &'de str) -> Documents<'de> {
    Documents::new(source_name, serde_yaml::Deserializer::from_str(input))
}

impl<'de> Documents<'de> {
    fn new(source_name: impl Into<String>, documents: serde_yaml::Deserializer<'de>) -> Self {
        Self {
            source_name: source_name.into(),
            documents,
            document: 0,
            pending: VecDeque::new(),
            failed: false,
        }
    }

    fn next_document(&mut self) -> Option<Result<JsonValue>> {
        let document = self.documents.next()?;
        self.document += 1;
        Some(
            JsonValue::deserialize(document).map_err(|error| ConvertError::Decode {
                source_name: self.source_name.clone(),
                document: self.document,
                error,
            }),
        )
    }

    fn object_from(&self, value: JsonValue) -> Result<ResourceObject> {
        ResourceObject::from_json(value).map_err(|error| ConvertError::InvalidDocument {
            source_name: self.source_name.clone(),
            document: self.document,
            error,
        })
    }
}

impl Iterator for Documents<'_> {
    type Item = Result<ResourceObject>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(value) = self.pending.pop_front() {
                let result = self.object_from(value);
                self.failed = result.is_err();
                return Some(result);
            }

            let value = match self.next_document()? {
                Ok(value) => value,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };

            match value {
                JsonValue::Null => {
                    tracing::debug!(source = %self.source_name, document = self.document, "skipping empty document");
                }
                JsonValue::Object(mut map) if is_list(&map) => {
                    match map.remove("items") {
                        Some(JsonValue::Array(items)) => self.pending.extend(items),
                        Some(JsonValue::Null) | None => {}
                        Some(_) => {
                            self.failed = true;
                            return Some(Err(ConvertError::InvalidDocument {
                                source_name: self.source_name.clone(),
                                document: self.document,
                                error: CoreError::InvalidObject {
                                    message: "List items is not a sequence".to_string(),
                                },
                            }));
                        }
                    }
                }
                other => self.pending.push_back(other),
            }
        }
    }
}

fn is_list(map: &serde_json::Map<String, JsonValue>) -> bool {
    map.get("kind").and_then(JsonValue::as_str) == Some("List")
}
