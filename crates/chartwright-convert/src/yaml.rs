//! YAML formatting helpers for template bodies

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;

/// A single-quoted scalar that starts with a template action
static QUOTED_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'(\{\{[^\n']*\}\}[^\n']*)'").expect("valid regex"));

/// Serialize `value` and indent every line by `indent` spaces
///
/// The trailing newline is removed so callers can join fragments freely.
pub fn to_yaml_indented<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String> {
    let yaml = serde_yaml::to_string(value)?;
    Ok(indent_lines(yaml.trim_end_matches('\n'), indent))
}

/// Prefix each non-empty line with `indent` spaces
pub fn indent_lines(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove the quotes YAML serialization puts around template actions
///
/// Template expressions are inserted into object trees as strings; the
/// serializer quotes them because `{` starts a flow mapping. Helm renders the
/// action first, so the quotes must go.
pub fn strip_template_quotes(text: &str) -> String {
    QUOTED_TEMPLATE.replace_all(text, "$1").into_owned()
}

/// Serialize a partially templated tree at the given indent
pub fn render_tree<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String> {
    Ok(strip_template_quotes(&to_yaml_indented(value, indent)?))
}
