use serde_json::{Map, Value};

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// String form of a form value as it appears in generated configuration.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces every `$name` token with `mapping[name]`.
///
/// A name is the longest run of `[A-Za-z0-9_]` after the `$`. Names missing
/// from the mapping become empty text; a lone `$` is kept. Substituted text is
/// not scanned again.
pub fn replace_template(template: &str, mapping: &Map<String, Value>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        rendered.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after
            .find(|c: char| !is_name_char(c))
            .unwrap_or(after.len());

        if name_len == 0 {
            rendered.push('$');
        } else if let Some(value) = mapping.get(&after[..name_len]) {
            rendered.push_str(&value_to_text(value));
        }
        rest = &after[name_len..];
    }

    rendered.push_str(rest);
    rendered
}
