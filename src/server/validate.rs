//! Declared-field validation and sanitization.
//!
//! Every operation's declared input fields must be present in the request
//! body as non-empty strings (after trimming). Values are HTML-escaped before
//! they reach a prompt template, so a field can never smuggle markup through
//! the gateway.

use serde_json::Value;

use crate::error::FieldError;
use crate::provider::InputBundle;

/// Neutralize HTML-unsafe characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Check `body` against the declared `fields` and build the input bundle.
///
/// Returns every failing field at once so a client can fix its request in a
/// single round trip. The execution path is never reached when this fails.
pub fn sanitize(body: Option<&Value>, fields: &[&str]) -> Result<InputBundle, Vec<FieldError>> {
    let mut bundle = InputBundle::new();
    let mut errors = Vec::new();

    for &field in fields {
        let value = body
            .and_then(|body| body.get(field))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match value {
            Some(value) => {
                bundle.insert(field.to_string(), escape_html(value));
            }
            None => errors.push(FieldError {
                field: field.to_string(),
                message: "Invalid value".to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(bundle)
    } else {
        Err(errors)
    }
}
