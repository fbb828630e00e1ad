//! Converted chart fragments

use chartwright_core::ValuesMap;
use std::io;

/// One renderable chart fragment produced from one source object
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    filename: String,
    values: ValuesMap,
    body: String,
}

impl Template {
    pub fn new(filename: impl Into<String>, values: ValuesMap, body: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            values,
            body: body.into(),
        }
    }

    /// File under `templates/` this fragment belongs to
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Default values extracted from the object
    pub fn values(&self) -> &ValuesMap {
        &self.values
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Write the templated body, newline terminated
    pub fn write(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        sink.write_all(self.body.as_bytes())?;
        if !self.body.ends_with('\n') {
            sink.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// File name for an object-specific template
///
/// Lowercased, with anything outside `[a-z0-9.-]` replaced by `-`.
pub fn object_filename(stem: &str, suffix: &str) -> String {
    let sanitize = |s: &str| -> String {
        s.chars()
            .map(|c| c.to_ascii_lowercase())
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    };

    if suffix.is_empty() {
        format!("{}.yaml", sanitize(stem))
    } else {
        format!("{}-{}.yaml", sanitize(stem), sanitize(suffix))
    }
}
